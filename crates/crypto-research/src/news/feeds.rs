//! Outlet RSS feeds
//!
//! General crypto feeds filtered down to entries that mention the coin.

use async_trait::async_trait;
use reqwest::Client;

use super::NewsSource;
use super::rss::{self, FeedEntry};
use crate::error::Result;
use crate::model::{NewsItem, Symbol};

/// Default outlets as (display name, feed URL), in query order
pub const DEFAULT_OUTLET_FEEDS: &[(&str, &str)] = &[
    ("Cointelegraph", "https://cointelegraph.com/rss"),
    ("CoinDesk", "https://www.coindesk.com/arc/outboundfeeds/rss/"),
    ("Bitcoin Magazine", "https://bitcoinmagazine.com/feed"),
];

/// Entries inspected per feed
const SCAN_DEPTH: usize = 20;

const SERVICE: &str = "outlet_feed";

pub struct OutletFeedSource {
    client: Client,
    name: String,
    url: String,
}

impl OutletFeedSource {
    pub fn new(client: Client, name: &str, url: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn select(&self, symbol: Symbol, entries: Vec<FeedEntry>, limit: usize) -> Vec<NewsItem> {
        entries
            .into_iter()
            .take(SCAN_DEPTH)
            .filter(|e| symbol.mentioned_in(&e.title) || symbol.mentioned_in(&e.description))
            .take(limit)
            .map(|e| {
                NewsItem::new(e.title, self.name.clone(), e.link)
                    .with_published(e.published)
                    .with_description(&e.description)
            })
            .collect()
    }
}

#[async_trait]
impl NewsSource for OutletFeedSource {
    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        let entries = rss::fetch_feed(&self.client, SERVICE, &self.url, &[]).await?;
        Ok(self.select(symbol, entries, limit))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
