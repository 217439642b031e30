//! # crypto-research
//!
//! Market data, news aggregation and agent tools for cryptocurrency research.
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────┐   get_crypto_price   ┌──────────────────┐
//! │              │ ───────────────────▶ │ CoinGecko        │
//! │  Reasoning   │                      └──────────────────┘
//! │    loop      │   get_crypto_news    ┌──────────────────┐
//! │              │ ───────────────────▶ │ NewsAggregator   │
//! └──────────────┘                      │  Google News RSS │
//!                                       │  CryptoPanic     │
//!                                       │  Outlet feeds    │
//!                                       └──────────────────┘
//! ```
//!
//! Symbols are validated against [`model::SUPPORTED_COINS`] before any
//! network call is made.

pub mod error;
pub mod http;
pub mod model;
pub mod news;
pub mod price;
pub mod svckit;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use error::{ErrorKind, ResearchError, Result};
pub use model::{NewsItem, PriceRecord, SUPPORTED_COINS, Symbol};
pub use news::{NewsAggregator, NewsSettings, NewsSource};
pub use price::{CoinGeckoClient, PriceSource};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{MAX_ARTICLES, NEWS_TOOL, NewsLookupTool, PRICE_TOOL, PriceLookupTool};
}

/// Registry with the price and news tools
pub fn research_tools(prices: Arc<dyn PriceSource>, news: Arc<NewsAggregator>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::PriceLookupTool::new(prices));
    registry.register(tools::NewsLookupTool::new(news));
    registry
}

/// System prompt for the research agent
pub const RESEARCH_PROMPT: &str = r"You are a professional cryptocurrency research analyst. Your job is to provide
comprehensive, data-driven research briefs about cryptocurrencies.

When researching a cryptocurrency, you should:
1. First fetch the current price and market data using the get_crypto_price tool
2. Then fetch recent news using the get_crypto_news tool
3. Synthesize all information into a well-structured research brief

Your research brief should include:
- **Price Analysis**: Current price, recent price changes, and market position
- **Market Overview**: Market cap, trading volume, and supply information
- **News Summary**: Key recent developments and news (summarize, don't just list)
- **Key Takeaways**: 2-3 bullet points highlighting the most important insights

Be objective and factual. Cite specific numbers from the data. If data is unavailable,
acknowledge it rather than making assumptions.

Format your response in clean markdown with clear sections.";

const DETAILED_INSTRUCTION: &str = "\n\nProvide an EXTREMELY detailed analysis including:
- Technical analysis of price movements
- Comparison to market trends
- Detailed news analysis with potential market impact
- Risk factors and considerations
- Supply and tokenomics analysis";

/// Opening user message for a research run
pub fn research_request(symbol: Symbol, detailed: bool) -> String {
    let mut request = format!(
        "Research the cryptocurrency {symbol} and provide a comprehensive research brief."
    );
    if detailed {
        request.push_str(DETAILED_INSTRUCTION);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::StaticNewsSource;
    use crate::price::FixedPriceSource;
    use agent_core::{
        AgentBuilder, Completion, ContentBlock, GenerationOptions, LlmProvider, Message, Role,
        ToolSchema,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned turns and keeps every conversation it was sent
    struct Scripted {
        turns: Mutex<VecDeque<Vec<ContentBlock>>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            messages: &[Message],
            _tools: &[ToolSchema],
            options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let content = self.turns.lock().unwrap().pop_front().unwrap_or_default();
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    fn tool_use(id: &str, name: &str, input: serde_json::Value) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    #[tokio::test]
    async fn test_research_run_with_both_tools() {
        let provider = Arc::new(Scripted {
            turns: Mutex::new(VecDeque::from(vec![
                vec![
                    tool_use("t1", tools::PRICE_TOOL, json!({"ticker": "BTC"})),
                    tool_use("t2", tools::NEWS_TOOL, json!({"ticker": "DOESNOTEXIST"})),
                ],
                vec![ContentBlock::text("# Bitcoin brief")],
            ])),
            seen: Mutex::new(Vec::new()),
        });
        let news: Arc<dyn NewsSource> = Arc::new(StaticNewsSource::new("static", Vec::new()));

        let agent = AgentBuilder::new()
            .provider(provider.clone())
            .tools(research_tools(
                Arc::new(FixedPriceSource::with_bitcoin()),
                Arc::new(NewsAggregator::new(vec![news])),
            ))
            .system_prompt(RESEARCH_PROMPT)
            .build()
            .unwrap();

        let btc = Symbol::parse("BTC").unwrap();
        let outcome = agent.ask(&research_request(btc, false)).await.unwrap();
        assert_eq!(outcome.text, "# Bitcoin brief");
        assert_eq!(outcome.session.invocations.len(), 2);
        assert!(outcome.session.invocations[0].success);
        assert!(!outcome.session.invocations[1].success);

        // The second request carries both results, the failure flagged as an error
        let seen = provider.seen.lock().unwrap();
        let results = seen[1].last().unwrap();
        assert_eq!(results.role, Role::Tool);
        match (&results.content[0], &results.content[1]) {
            (
                ContentBlock::ToolResult { content: price, is_error: false, .. },
                ContentBlock::ToolResult { content: news, is_error: true, .. },
            ) => {
                assert!(price.contains("67234.56"));
                assert!(news.contains("DOESNOTEXIST"));
            }
            other => panic!("unexpected tool results: {other:?}"),
        }
    }

    #[test]
    fn test_research_request() {
        let sol = Symbol::parse("sol").unwrap();
        let brief = research_request(sol, false);
        assert_eq!(
            brief,
            "Research the cryptocurrency SOL and provide a comprehensive research brief."
        );
        assert!(research_request(sol, true).contains("tokenomics"));
    }

    #[test]
    fn test_research_tools_registered() {
        let news: Arc<dyn NewsSource> = Arc::new(StaticNewsSource::new("static", Vec::new()));
        let registry = research_tools(
            Arc::new(FixedPriceSource::with_bitcoin()),
            Arc::new(NewsAggregator::new(vec![news])),
        );
        assert_eq!(registry.names(), vec![tools::NEWS_TOOL, tools::PRICE_TOOL]);
        assert!(RESEARCH_PROMPT.contains(tools::PRICE_TOOL));
        assert!(RESEARCH_PROMPT.contains(tools::NEWS_TOOL));
    }
}
