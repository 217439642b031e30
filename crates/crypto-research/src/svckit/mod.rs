//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the research agent.

mod news_lookup;
mod price_lookup;

pub use news_lookup::{MAX_ARTICLES, NEWS_TOOL, NewsLookupTool};
pub use price_lookup::{PRICE_TOOL, PriceLookupTool};
