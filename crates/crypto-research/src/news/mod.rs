//! News Aggregation
//!
//! Sources are queried in order, each asked only for the items still
//! missing. A failing source is logged and skipped, so aggregation never
//! fails; the worst case is an empty list.
//!
//! ```text
//!   Google News RSS ──▶ CryptoPanic ──▶ Cointelegraph ──▶ CoinDesk ──▶ Bitcoin Magazine
//!        (stop as soon as `limit` items are collected)
//! ```

mod cryptopanic;
mod feeds;
#[cfg(any(test, feature = "testkit"))]
mod fixed;
mod google;
pub mod rss;

pub use cryptopanic::{CryptoPanicSource, DEFAULT_CRYPTOPANIC_URL};
pub use feeds::{DEFAULT_OUTLET_FEEDS, OutletFeedSource};
#[cfg(any(test, feature = "testkit"))]
pub use fixed::StaticNewsSource;
pub use google::{DEFAULT_GOOGLE_NEWS_URL, GoogleNewsSource};

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::http;
use crate::model::{NewsItem, Symbol};

/// Default number of articles per request
pub const DEFAULT_NEWS_LIMIT: usize = 5;

/// News source trait (Strategy pattern)
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Up to `limit` recent items about `symbol`
    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<NewsItem>>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Endpoints and credentials for the default source chain
#[derive(Clone, Debug)]
pub struct NewsSettings {
    pub google_news_url: String,
    pub cryptopanic_url: String,
    pub cryptopanic_key: Option<String>,
    /// Outlet feeds as (display name, URL)
    pub outlet_feeds: Vec<(String, String)>,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            google_news_url: DEFAULT_GOOGLE_NEWS_URL.into(),
            cryptopanic_url: DEFAULT_CRYPTOPANIC_URL.into(),
            cryptopanic_key: None,
            outlet_feeds: DEFAULT_OUTLET_FEEDS
                .iter()
                .map(|(name, url)| ((*name).to_string(), (*url).to_string()))
                .collect(),
        }
    }
}

/// Ordered chain of news sources
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
}

impl NewsAggregator {
    pub fn new(sources: Vec<Arc<dyn NewsSource>>) -> Self {
        Self { sources }
    }

    /// Google News, then CryptoPanic, then the outlet feeds, sharing one HTTP client
    pub fn from_settings(settings: &NewsSettings) -> Result<Self> {
        let client = http::build_client()?;

        let mut sources: Vec<Arc<dyn NewsSource>> = vec![
            Arc::new(GoogleNewsSource::new(client.clone(), &settings.google_news_url)),
            Arc::new(CryptoPanicSource::new(
                client.clone(),
                &settings.cryptopanic_url,
                settings.cryptopanic_key.clone(),
            )),
        ];
        for (name, url) in &settings.outlet_feeds {
            sources.push(Arc::new(OutletFeedSource::new(client.clone(), name, url)));
        }

        Ok(Self::new(sources))
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Collect at most `limit` items, newest first; undated items sort last
    pub async fn fetch(&self, symbol: Symbol, limit: usize) -> Vec<NewsItem> {
        let mut items: Vec<NewsItem> = Vec::new();
        let mut seen_links = HashSet::new();

        for source in &self.sources {
            let remaining = limit.saturating_sub(items.len());
            if remaining == 0 {
                break;
            }

            match source.fetch(symbol, remaining).await {
                Ok(found) => {
                    tracing::debug!(
                        source = source.name(),
                        symbol = %symbol,
                        count = found.len(),
                        "News fetched"
                    );
                    let fresh = found
                        .into_iter()
                        .filter(|item| {
                            item.link.is_empty() || seen_links.insert(item.link.clone())
                        })
                        .take(remaining);
                    items.extend(fresh);
                }
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        symbol = %symbol,
                        error = %e,
                        "News source failed"
                    );
                }
            }
        }

        // Stable sort keeps source order among equal or missing timestamps
        items.sort_by(|a, b| b.published.cmp(&a.published));
        items
    }
}
