//! Command-line definition

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser, Subcommand};

use agent_core::provider::DEFAULT_MODEL;
use agent_core::reasoning::DEFAULT_MAX_ITERATIONS;
use agent_runtime::anthropic::DEFAULT_BASE_URL;
use crypto_research::news::{DEFAULT_CRYPTOPANIC_URL, DEFAULT_GOOGLE_NEWS_URL, DEFAULT_NEWS_LIMIT};
use crypto_research::price::DEFAULT_COINGECKO_URL;
use crypto_research::tools::MAX_ARTICLES;

/// AI-powered cryptocurrency research agent using Claude
#[derive(Debug, Parser)]
#[command(name = "crypto-research", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Claude model used for research
    #[arg(long, global = true, env = "CRYPTO_RESEARCH_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Maximum model calls per research run
    #[arg(
        long,
        global = true,
        env = "CRYPTO_RESEARCH_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS
    )]
    pub max_iterations: usize,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub endpoints: Endpoints,
}

/// Service endpoints; overridable for self-hosted proxies and tests
#[derive(Debug, clap::Args)]
pub struct Endpoints {
    #[arg(long, hide = true, env = "COINGECKO_API_URL", default_value = DEFAULT_COINGECKO_URL)]
    pub coingecko_url: String,

    #[arg(long, hide = true, env = "GOOGLE_NEWS_RSS_URL", default_value = DEFAULT_GOOGLE_NEWS_URL)]
    pub google_news_url: String,

    #[arg(long, hide = true, env = "CRYPTOPANIC_API_URL", default_value = DEFAULT_CRYPTOPANIC_URL)]
    pub cryptopanic_url: String,

    #[arg(long, hide = true, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub anthropic_url: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Research a cryptocurrency and generate an AI-powered analysis report
    Research {
        /// Cryptocurrency ticker symbol (e.g., BTC, ETH, SOL)
        symbol: String,

        /// Provide more detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Show the tools called before the report
        #[arg(short, long)]
        raw: bool,
    },

    /// Fetch and display current price data (no AI)
    Price {
        /// Cryptocurrency ticker symbol (e.g., BTC, ETH, SOL)
        symbol: String,
    },

    /// Fetch and display recent news (no AI)
    News {
        /// Cryptocurrency ticker symbol (e.g., BTC, ETH, SOL)
        symbol: String,

        /// Maximum number of articles to fetch (0-25)
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_NEWS_LIMIT,
            value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_ARTICLES as u64)
        )]
        limit: usize,
    },

    /// List all supported cryptocurrency tickers
    Supported,
}
