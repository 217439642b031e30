//! Error Types for Crypto Research

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResearchError>;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Unsupported symbol: {0}. Run `crypto-research supported` to list supported symbols")]
    UnsupportedSymbol(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream error from {service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Missing credential: {0} is not set")]
    CredentialMissing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse failure classes used for reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NetworkFailure,
    UpstreamError,
    CredentialMissing,
}

impl ResearchError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedSymbol(_) => ErrorKind::InvalidInput,
            Self::Network(_) => ErrorKind::NetworkFailure,
            // Undecodable payloads count as a misbehaving upstream
            Self::Upstream { .. } | Self::Serialization(_) => ErrorKind::UpstreamError,
            Self::CredentialMissing(_) => ErrorKind::CredentialMissing,
        }
    }
}

impl From<ResearchError> for AgentError {
    fn from(err: ResearchError) -> Self {
        Self::ToolExecution(err.to_string())
    }
}
