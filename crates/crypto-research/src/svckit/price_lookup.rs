//! Price Lookup Tool
//!
//! Fetches the current market snapshot for one coin.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::model::Symbol;
use crate::price::PriceSource;

pub const PRICE_TOOL: &str = "get_crypto_price";

/// Tool for looking up cryptocurrency prices
pub struct PriceLookupTool {
    source: Arc<dyn PriceSource>,
}

impl PriceLookupTool {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for PriceLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: PRICE_TOOL.into(),
            description: "Fetches current price and market data for a cryptocurrency from CoinGecko. \
                Returns current price in USD, 24h/7d/30d price changes, market cap, trading volume, \
                and other market statistics."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "ticker",
                "The cryptocurrency ticker symbol (e.g., 'BTC' for Bitcoin, 'ETH' for Ethereum, 'SOL' for Solana)",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let ticker = call
            .str_arg("ticker")
            .ok_or_else(|| AgentError::ToolValidation("ticker must be a string".into()))?;

        let symbol = Symbol::parse(ticker)?;
        let record = self.source.fetch(symbol).await?;

        tracing::info!(symbol = %symbol, source = self.source.name(), price = %record.price, "Price fetched");

        Ok(ToolResult::success(PRICE_TOOL, serde_json::to_string_pretty(&record)?))
    }
}
