//! Google News RSS search

use async_trait::async_trait;
use reqwest::Client;

use super::NewsSource;
use super::rss::{self, FeedEntry};
use crate::error::Result;
use crate::model::{NewsItem, Symbol};

pub const DEFAULT_GOOGLE_NEWS_URL: &str = "https://news.google.com/rss/search";

const SERVICE: &str = "google_news";

pub struct GoogleNewsSource {
    client: Client,
    url: String,
}

impl GoogleNewsSource {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        let query = format!("{} cryptocurrency", symbol.primary_term());
        let entries = rss::fetch_feed(
            &self.client,
            SERVICE,
            &self.url,
            &[
                ("q", query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ],
        )
        .await?;

        Ok(entries.into_iter().take(limit).map(to_item).collect())
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Google titles read "Headline - Outlet"; split the outlet off
fn to_item(entry: FeedEntry) -> NewsItem {
    let (title, suffix) = match entry.title.rsplit_once(" - ") {
        Some((head, outlet)) if !head.trim().is_empty() => {
            (head.trim().to_string(), Some(outlet.trim().to_string()))
        }
        _ => (entry.title.clone(), None),
    };

    let source = entry
        .source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or(suffix)
        .unwrap_or_else(|| "Google News".into());

    NewsItem::new(title, source, entry.link)
        .with_published(entry.published)
        .with_description(&entry.description)
}
