//! Shared HTTP client setup for data sources

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{ResearchError, Result};

/// Timeout applied to every market-data and news request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Some feeds reject unknown agents
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const RSS_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";

/// Client with the browser user agent and the default timeout
pub fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Turn a non-2xx response into an upstream error carrying a body excerpt
pub async fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    Err(ResearchError::upstream(
        service,
        format!("HTTP {status}: {}", excerpt.trim()),
    ))
}
