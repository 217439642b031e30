//! Command handlers

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use agent_core::AgentBuilder;
use agent_runtime::AnthropicProvider;
use crypto_research::{
    CoinGeckoClient, ErrorKind, NewsAggregator, PriceSource, RESEARCH_PROMPT, ResearchError,
    Symbol, research_request, research_tools,
};

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::render::Renderer;

pub async fn run(cli: &Cli, renderer: &Renderer) -> Result<()> {
    let settings = Settings::from_cli(cli);

    match &cli.command {
        Command::Price { symbol } => price(&settings, renderer, symbol).await,
        Command::News { symbol, limit } => news(&settings, renderer, symbol, *limit).await,
        Command::Research {
            symbol,
            detailed,
            raw,
        } => research(&settings, renderer, symbol, *detailed, *raw).await,
        Command::Supported => {
            print!("{}\n{}", renderer.header(), renderer.supported_table());
            Ok(())
        }
    }
}

/// Error panel title for a failed command
pub fn error_title(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ResearchError>().map(ResearchError::kind) {
        Some(ErrorKind::InvalidInput) => "Invalid Input",
        Some(ErrorKind::NetworkFailure) => "Network Error",
        Some(ErrorKind::UpstreamError) => "Upstream Error",
        Some(ErrorKind::CredentialMissing) => "Configuration Error",
        None => "Error",
    }
}

async fn price(settings: &Settings, renderer: &Renderer, raw: &str) -> Result<()> {
    let symbol = Symbol::parse(raw)?;
    println!("{}", renderer.header());

    let client = CoinGeckoClient::with_base_url(settings.coingecko_url.as_str())?;
    let spinner = Renderer::spinner(&format!("Fetching price data for {symbol}..."));
    let record = client.fetch(symbol).await;
    spinner.finish_and_clear();

    print!("{}", renderer.price_table(&record?));
    Ok(())
}

async fn news(settings: &Settings, renderer: &Renderer, raw: &str, limit: usize) -> Result<()> {
    let symbol = Symbol::parse(raw)?;
    println!("{}", renderer.header());

    let aggregator = NewsAggregator::from_settings(&settings.news)?;
    debug!(sources = ?aggregator.source_names(), "News sources configured");

    let spinner = Renderer::spinner(&format!("Fetching news for {symbol}..."));
    let items = aggregator.fetch(symbol, limit).await;
    spinner.finish_and_clear();

    print!("{}", renderer.news_list(symbol, &items));
    Ok(())
}

async fn research(
    settings: &Settings,
    renderer: &Renderer,
    raw: &str,
    detailed: bool,
    show_tools: bool,
) -> Result<()> {
    let symbol = Symbol::parse(raw)?;
    let anthropic = settings.anthropic()?;

    println!("{}", renderer.header());
    println!("{}", renderer.researching(symbol));

    let provider = Arc::new(AnthropicProvider::from_config(anthropic)?);
    let prices = Arc::new(CoinGeckoClient::with_base_url(settings.coingecko_url.as_str())?);
    let news = Arc::new(NewsAggregator::from_settings(&settings.news)?);

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(research_tools(prices, news))
        .system_prompt(RESEARCH_PROMPT)
        .model(settings.model.as_str())
        .max_iterations(settings.max_iterations)
        .build()?;

    info!(symbol = %symbol, model = %settings.model, detailed, "Starting research");

    let spinner = Renderer::spinner("Fetching price data and news...");
    let outcome = agent.ask(&research_request(symbol, detailed)).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    info!(
        session = outcome.session.id.as_str(),
        iterations = outcome.session.iterations,
        tools = outcome.session.invocations.len(),
        elapsed_ms = outcome.session.duration().num_milliseconds(),
        "Research complete"
    );
    print!("{}", renderer.report(symbol, &outcome, show_tools));
    Ok(())
}
