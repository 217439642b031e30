//! Fixed Price Source
//!
//! In-memory records for tests. Symbols without a record fail like an
//! upstream that returned no price.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use super::PriceSource;
use crate::error::{ResearchError, Result};
use crate::model::{PriceRecord, Symbol};

#[derive(Default)]
pub struct FixedPriceSource {
    records: HashMap<&'static str, PriceRecord>,
    calls: AtomicUsize,
}

impl FixedPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source pre-loaded with a BTC record
    pub fn with_bitcoin() -> Self {
        Self::new().with_record(Self::bitcoin())
    }

    pub fn with_record(mut self, record: PriceRecord) -> Self {
        if let Ok(symbol) = Symbol::parse(&record.symbol) {
            self.records.insert(symbol.ticker(), record);
        }
        self
    }

    /// Number of fetches served, including failed ones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Representative BTC snapshot
    pub fn bitcoin() -> PriceRecord {
        PriceRecord {
            symbol: "BTC".into(),
            name: "Bitcoin".into(),
            price: dec!(67234.56),
            change_24h: Some(dec!(2.34)),
            change_7d: Some(dec!(-1.25)),
            change_30d: Some(dec!(0)),
            market_cap: Some(dec!(1324500000000)),
            rank: Some(1),
            volume_24h: Some(dec!(28500000000)),
            high_24h: Some(dec!(68000)),
            low_24h: Some(dec!(65000.25)),
            ath: Some(dec!(73738)),
            ath_date: Utc.with_ymd_and_hms(2024, 3, 14, 7, 10, 36).single(),
            circulating_supply: Some(dec!(19700000)),
            total_supply: Some(dec!(21000000)),
            last_updated: Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).single(),
        }
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn fetch(&self, symbol: Symbol) -> Result<PriceRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(symbol.ticker())
            .cloned()
            .ok_or_else(|| ResearchError::upstream("fixed", format!("no record for {symbol}")))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
