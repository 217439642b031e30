//! Price Data
//!
//! Market-data sources that turn a validated [`Symbol`] into a [`PriceRecord`].

mod coingecko;
#[cfg(any(test, feature = "testkit"))]
mod fixed;

pub use coingecko::{CoinGeckoClient, DEFAULT_COINGECKO_URL};
#[cfg(any(test, feature = "testkit"))]
pub use fixed::FixedPriceSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{PriceRecord, Symbol};

/// Price source trait (Strategy pattern)
///
/// One request per lookup; implementations do not retry.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current market snapshot for a symbol
    async fn fetch(&self, symbol: Symbol) -> Result<PriceRecord>;

    /// Source name for logs
    fn name(&self) -> &str;
}
