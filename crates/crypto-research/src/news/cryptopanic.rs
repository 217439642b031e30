//! CryptoPanic posts API
//!
//! Works without a key on the public tier; `auth_token` is sent when configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::NewsSource;
use crate::error::Result;
use crate::http;
use crate::model::{NewsItem, Symbol, parse_timestamp};

pub const DEFAULT_CRYPTOPANIC_URL: &str = "https://cryptopanic.com/api/v1/posts/";

const SERVICE: &str = "cryptopanic";

pub struct CryptoPanicSource {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl CryptoPanicSource {
    pub fn new(client: Client, url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn query(&self, symbol: Symbol) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("currencies", symbol.ticker().to_string()),
            ("kind", "news".to_string()),
            ("public", "true".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("auth_token", key.clone()));
        }
        query
    }
}

#[async_trait]
impl NewsSource for CryptoPanicSource {
    async fn fetch(&self, symbol: Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(&self.url)
            .query(&self.query(symbol))
            .send()
            .await?;

        let body = http::check_status(SERVICE, response).await?.text().await?;
        parse_posts(&body, limit)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

fn parse_posts(body: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let posts: PostsResponse = serde_json::from_str(body)?;

    Ok(posts
        .results
        .into_iter()
        .filter_map(|mut post| {
            let title = post.title.take()?.trim().to_string();
            (!title.is_empty()).then_some((title, post))
        })
        .take(limit)
        .map(|(title, post)| {
            let source = post
                .source
                .and_then(|s| s.title)
                .unwrap_or_else(|| "CryptoPanic".into());
            NewsItem::new(title, source, post.url.unwrap_or_default())
                .with_published(post.published_at.as_deref().and_then(parse_timestamp))
        })
        .collect())
}

#[derive(Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    source: Option<PostSource>,
}

#[derive(Deserialize)]
struct PostSource {
    #[serde(default)]
    title: Option<String>,
}
