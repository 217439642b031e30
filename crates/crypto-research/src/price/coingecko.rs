//! CoinGecko Price Source
//!
//! Public `/coins/{id}` endpoint; no API key required.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::PriceSource;
use crate::error::{ResearchError, Result};
use crate::http;
use crate::model::{PriceRecord, Symbol, parse_timestamp};

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

const SERVICE: &str = "coingecko";

/// CoinGecko market-data client
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_COINGECKO_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn coin_url(&self, symbol: Symbol) -> String {
        format!("{}/coins/{}", self.base_url, symbol.coingecko_id())
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch(&self, symbol: Symbol) -> Result<PriceRecord> {
        tracing::debug!(symbol = %symbol, id = symbol.coingecko_id(), "Fetching price");

        let response = self
            .client
            .get(self.coin_url(symbol))
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;

        let body = http::check_status(SERVICE, response).await?.text().await?;
        parse_coin(symbol, &body)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Build a record from a `/coins/{id}` response body
fn parse_coin(symbol: Symbol, body: &str) -> Result<PriceRecord> {
    let coin: CoinResponse = serde_json::from_str(body)?;
    let market = coin
        .market_data
        .ok_or_else(|| ResearchError::upstream(SERVICE, "response has no market_data"))?;

    let price = market
        .current_price
        .usd
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| ResearchError::upstream(SERVICE, "missing or non-positive USD price"))?;

    let name = coin.name.unwrap_or_else(|| symbol.ticker().to_string());

    Ok(PriceRecord {
        change_24h: market.price_change_percentage_24h,
        change_7d: market.price_change_percentage_7d,
        change_30d: market.price_change_percentage_30d,
        market_cap: market.market_cap.usd,
        rank: market.market_cap_rank.or(coin.market_cap_rank),
        volume_24h: market.total_volume.usd,
        high_24h: market.high_24h.usd,
        low_24h: market.low_24h.usd,
        ath: market.ath.usd,
        ath_date: market.ath_date.usd.as_deref().and_then(parse_timestamp),
        circulating_supply: market.circulating_supply,
        total_supply: market.total_supply,
        last_updated: coin.last_updated.as_deref().and_then(parse_timestamp),
        ..PriceRecord::new(symbol, name, price)
    })
}

#[derive(Deserialize)]
struct CoinResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    market_data: Option<MarketData>,
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: Usd<Decimal>,
    #[serde(default)]
    price_change_percentage_24h: Option<Decimal>,
    #[serde(default)]
    price_change_percentage_7d: Option<Decimal>,
    #[serde(default)]
    price_change_percentage_30d: Option<Decimal>,
    #[serde(default)]
    market_cap: Usd<Decimal>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    total_volume: Usd<Decimal>,
    #[serde(default)]
    high_24h: Usd<Decimal>,
    #[serde(default)]
    low_24h: Usd<Decimal>,
    #[serde(default)]
    ath: Usd<Decimal>,
    #[serde(default)]
    ath_date: Usd<String>,
    #[serde(default)]
    circulating_supply: Option<Decimal>,
    #[serde(default)]
    total_supply: Option<Decimal>,
}

/// Per-currency map; only USD is read
#[derive(Deserialize)]
struct Usd<T> {
    #[serde(default)]
    usd: Option<T>,
}

impl<T> Default for Usd<T> {
    fn default() -> Self {
        Self { usd: None }
    }
}
