//! News Lookup Tool
//!
//! Recent articles about one coin from the aggregated news sources.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::model::Symbol;
use crate::news::{DEFAULT_NEWS_LIMIT, NewsAggregator};

pub const NEWS_TOOL: &str = "get_crypto_news";

/// Upper bound on `max_articles`
pub const MAX_ARTICLES: usize = 25;

/// Tool for fetching recent cryptocurrency news
pub struct NewsLookupTool {
    aggregator: Arc<NewsAggregator>,
}

impl NewsLookupTool {
    pub fn new(aggregator: Arc<NewsAggregator>) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl Tool for NewsLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NEWS_TOOL.into(),
            description: "Fetches recent news articles about a cryptocurrency from Google News, \
                CryptoPanic and major crypto news RSS feeds. Returns article titles, URLs, sources, \
                and publication dates."
                .into(),
            parameters: vec![
                ParameterSchema::required_string(
                    "ticker",
                    "The cryptocurrency ticker symbol (e.g., 'BTC' for Bitcoin, 'ETH' for Ethereum, 'SOL' for Solana)",
                ),
                ParameterSchema::optional_integer(
                    "max_articles",
                    "Maximum number of news articles to fetch (default: 5)",
                    5,
                ),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call
            .str_arg("ticker")
            .ok_or_else(|| AgentError::ToolValidation("ticker must be a string".into()))?;
        let symbol = Symbol::parse(ticker)?;

        let limit = call
            .u64_arg("max_articles")
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_NEWS_LIMIT)
            .min(MAX_ARTICLES);

        let articles = self.aggregator.fetch(symbol, limit).await;
        tracing::info!(symbol = %symbol, count = articles.len(), "News fetched");

        let mut payload = json!({
            "ticker": symbol.ticker(),
            "article_count": articles.len(),
            "articles": articles,
        });
        if articles.is_empty() {
            payload["message"] = json!(format!(
                "No recent news found for {symbol}. This could be a less popular cryptocurrency."
            ));
        }

        Ok(ToolResult::success(NEWS_TOOL, serde_json::to_string_pretty(&payload)?))
    }
}
