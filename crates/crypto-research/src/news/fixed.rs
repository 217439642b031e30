//! Static News Source
//!
//! Serves canned items and records the limit of every request.

use std::sync::Mutex;

use async_trait::async_trait;

use super::NewsSource;
use crate::error::{ResearchError, Result};
use crate::model::{NewsItem, Symbol};

pub struct StaticNewsSource {
    name: String,
    items: Option<Vec<NewsItem>>,
    requests: Mutex<Vec<usize>>,
}

impl StaticNewsSource {
    pub fn new(name: impl Into<String>, items: Vec<NewsItem>) -> Self {
        Self {
            name: name.into(),
            items: Some(items),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Source whose every fetch fails with an upstream error
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Limits requested so far, in call order
    pub fn requests(&self) -> Vec<usize> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch(&self, _symbol: Symbol, limit: usize) -> Result<Vec<NewsItem>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(limit);
        }

        self.items
            .as_ref()
            .map(|items| items.iter().take(limit).cloned().collect())
            .ok_or_else(|| ResearchError::upstream("static", format!("{} is down", self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
