//! Runtime settings assembled from flags and the environment

use agent_runtime::AnthropicConfig;
use agent_runtime::anthropic::API_KEY_ENV;
use crypto_research::{NewsSettings, ResearchError};

use crate::cli::Cli;

/// Optional CryptoPanic token
const CRYPTOPANIC_KEY_ENV: &str = "CRYPTOPANIC_API_KEY";

#[derive(Clone, Debug)]
pub struct Settings {
    pub model: String,
    pub max_iterations: usize,
    pub coingecko_url: String,
    pub anthropic_url: String,
    pub news: NewsSettings,
    anthropic_key: Option<String>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_cli_with(cli, |name| std::env::var(name).ok())
    }

    /// Build settings reading credentials through `lookup`
    pub fn from_cli_with(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            model: cli.model.clone(),
            max_iterations: cli.max_iterations,
            coingecko_url: cli.endpoints.coingecko_url.clone(),
            anthropic_url: cli.endpoints.anthropic_url.clone(),
            news: NewsSettings {
                google_news_url: cli.endpoints.google_news_url.clone(),
                cryptopanic_url: cli.endpoints.cryptopanic_url.clone(),
                cryptopanic_key: non_blank(CRYPTOPANIC_KEY_ENV),
                ..NewsSettings::default()
            },
            anthropic_key: non_blank(API_KEY_ENV),
        }
    }

    /// Reasoning-engine config; fails when the API key is missing
    pub fn anthropic(&self) -> Result<AnthropicConfig, ResearchError> {
        let key = self
            .anthropic_key
            .clone()
            .ok_or_else(|| ResearchError::CredentialMissing(API_KEY_ENV.into()))?;
        Ok(AnthropicConfig::new(key).with_base_url(&self.anthropic_url))
    }
}

/// Log filter used when `RUST_LOG` is unset
pub const fn default_log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crypto_research::ErrorKind;

    fn cli() -> Cli {
        Cli::try_parse_from([
            "crypto-research",
            "--coingecko-url",
            "http://127.0.0.1:1/api",
            "--anthropic-url",
            "http://127.0.0.1:2",
            "supported",
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_key_is_credential_error() {
        let settings = Settings::from_cli_with(&cli(), |_| None);
        let err = settings.anthropic().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialMissing);
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let settings = Settings::from_cli_with(&cli(), |_| Some("  ".into()));
        assert!(settings.anthropic().is_err());
        assert!(settings.news.cryptopanic_key.is_none());
    }

    #[test]
    fn test_keys_and_endpoints_are_applied() {
        let settings = Settings::from_cli_with(&cli(), |name| match name {
            "ANTHROPIC_API_KEY" => Some("sk-test".into()),
            "CRYPTOPANIC_API_KEY" => Some("cp-test".into()),
            _ => None,
        });

        let anthropic = settings.anthropic().unwrap();
        assert_eq!(anthropic.api_key, "sk-test");
        assert_eq!(anthropic.base_url, "http://127.0.0.1:2");
        assert_eq!(settings.coingecko_url, "http://127.0.0.1:1/api");
        assert_eq!(settings.news.cryptopanic_key.as_deref(), Some("cp-test"));
        assert_eq!(settings.news.outlet_feeds.len(), 3);
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(default_log_directive(0), "warn");
        assert_eq!(default_log_directive(1), "info");
        assert_eq!(default_log_directive(5), "debug");
    }
}
