//! Domain Models
//!
//! Supported coins, market snapshots and news items.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// A coin the agent knows how to look up
#[derive(Debug, PartialEq, Eq)]
pub struct Coin {
    /// Upper-case ticker (e.g., "BTC")
    pub ticker: &'static str,

    /// CoinGecko coin id (e.g., "bitcoin")
    pub coingecko_id: &'static str,

    /// Lower-case terms used to find and filter news; the first is the main one
    pub search_terms: &'static [&'static str],
}

const fn coin(
    ticker: &'static str,
    coingecko_id: &'static str,
    search_terms: &'static [&'static str],
) -> Coin {
    Coin {
        ticker,
        coingecko_id,
        search_terms,
    }
}

/// Allow-list of supported coins
pub static SUPPORTED_COINS: &[Coin] = &[
    coin("BTC", "bitcoin", &["bitcoin", "btc"]),
    coin("ETH", "ethereum", &["ethereum", "eth"]),
    coin("SOL", "solana", &["solana", "sol"]),
    coin("ADA", "cardano", &["cardano", "ada"]),
    coin("DOT", "polkadot", &["polkadot", "dot"]),
    coin("DOGE", "dogecoin", &["dogecoin", "doge"]),
    coin("XRP", "ripple", &["ripple", "xrp"]),
    coin("AVAX", "avalanche-2", &["avalanche", "avax"]),
    coin("MATIC", "matic-network", &["polygon", "matic"]),
    coin("LINK", "chainlink", &["chainlink", "link"]),
    coin("UNI", "uniswap", &["uniswap", "uni"]),
    coin("ATOM", "cosmos", &["cosmos", "atom"]),
    coin("LTC", "litecoin", &["litecoin", "ltc"]),
    coin("BCH", "bitcoin-cash", &["bitcoin cash", "bch"]),
    coin("ALGO", "algorand", &["algorand", "algo"]),
    coin("XLM", "stellar", &["stellar", "xlm"]),
    coin("VET", "vechain", &["vechain", "vet"]),
    coin("FIL", "filecoin", &["filecoin", "fil"]),
    coin("TRX", "tron", &["tron", "trx"]),
    coin("ETC", "ethereum-classic", &["ethereum classic", "etc"]),
    coin("NEAR", "near", &["near protocol", "near"]),
    coin("APT", "aptos", &["aptos", "apt"]),
    coin("ARB", "arbitrum", &["arbitrum", "arb"]),
    coin("OP", "optimism", &["optimism"]),
    coin("SUI", "sui", &["sui"]),
    coin("SEI", "sei-network", &["sei network", "sei"]),
    coin("INJ", "injective-protocol", &["injective", "inj"]),
    coin("TIA", "celestia", &["celestia", "tia"]),
    coin("PEPE", "pepe", &["pepe"]),
    coin("SHIB", "shiba-inu", &["shiba inu", "shib"]),
    coin("WIF", "dogwifcoin", &["dogwifhat", "wif"]),
    coin("BONK", "bonk", &["bonk"]),
];

/// A validated ticker from [`SUPPORTED_COINS`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbol(&'static Coin);

impl Symbol {
    /// Validate a user-supplied ticker (case-insensitive, surrounding whitespace ignored)
    pub fn parse(input: &str) -> Result<Self> {
        let wanted = input.trim();
        SUPPORTED_COINS
            .iter()
            .find(|c| c.ticker.eq_ignore_ascii_case(wanted))
            .map(Self)
            .ok_or_else(|| ResearchError::UnsupportedSymbol(wanted.to_uppercase()))
    }

    /// Every supported symbol, in allow-list order
    pub fn all() -> impl Iterator<Item = Self> {
        SUPPORTED_COINS.iter().map(Self)
    }

    pub const fn ticker(self) -> &'static str {
        self.0.ticker
    }

    pub const fn coingecko_id(self) -> &'static str {
        self.0.coingecko_id
    }

    pub const fn search_terms(self) -> &'static [&'static str] {
        self.0.search_terms
    }

    /// Main news search term (usually the full coin name)
    pub fn primary_term(self) -> &'static str {
        self.0.search_terms.first().copied().unwrap_or(self.0.ticker)
    }

    /// Whether `text` mentions any of the coin's search terms
    pub fn mentioned_in(self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.search_terms().iter().any(|term| haystack.contains(term))
    }
}

impl FromStr for Symbol {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

/// Market snapshot for one coin, in USD
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Full name (e.g., "Bitcoin")
    pub name: String,

    /// Current price
    pub price: Decimal,

    /// Price change percentages
    pub change_24h: Option<Decimal>,
    pub change_7d: Option<Decimal>,
    pub change_30d: Option<Decimal>,

    /// Market capitalization
    pub market_cap: Option<Decimal>,

    /// Market cap rank (1 = largest)
    pub rank: Option<u32>,

    /// 24-hour trading volume
    pub volume_24h: Option<Decimal>,

    pub high_24h: Option<Decimal>,
    pub low_24h: Option<Decimal>,

    /// All-time high and when it was set
    pub ath: Option<Decimal>,
    pub ath_date: Option<DateTime<Utc>>,

    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,

    /// Last update reported by the data source
    pub last_updated: Option<DateTime<Utc>>,
}

impl PriceRecord {
    /// Record with only the required fields set
    pub fn new(symbol: Symbol, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.ticker().to_string(),
            name: name.into(),
            price,
            change_24h: None,
            change_7d: None,
            change_30d: None,
            market_cap: None,
            rank: None,
            volume_24h: None,
            high_24h: None,
            low_24h: None,
            ath: None,
            ath_date: None,
            circulating_supply: None,
            total_supply: None,
            last_updated: None,
        }
    }
}

/// Maximum characters kept from an article description
pub const DESCRIPTION_MAX_CHARS: usize = 300;

/// A news article from any source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,

    /// Outlet name (e.g., "CoinDesk")
    pub source: String,

    /// Publication time, when the source provides a parseable one
    pub published: Option<DateTime<Utc>>,

    pub link: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            published: None,
            link: link.into(),
            description: None,
        }
    }

    pub const fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    /// Set the description, truncated to [`DESCRIPTION_MAX_CHARS`]; blank text is dropped
    pub fn with_description(mut self, description: &str) -> Self {
        let trimmed = description.trim();
        self.description =
            (!trimmed.is_empty()).then(|| trimmed.chars().take(DESCRIPTION_MAX_CHARS).collect());
        self
    }
}

/// Parse the timestamp formats seen in feeds and APIs (RFC 2822, RFC 3339, naive UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}
