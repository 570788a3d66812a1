//! Exchange rate provider port.
//!
//! This trait defines the interface for upstream rate sources.
//! Implementations can be HTTP clients, static tables, mock providers, etc.

use crate::domain::{CurrencyCode, RateTable};

/// Error type for upstream rate fetches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Response body was empty")]
    EmptyBody,

    #[error("Could not parse response: {0}")]
    Parse(String),

    #[error("Upstream reported an error: {0}")]
    Upstream(String),
}

/// Error type for cross-rate resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("No rate available for {base} -> {request}")]
    NoRateAvailable {
        base: CurrencyCode,
        request: CurrencyCode,
    },
}

/// Port trait for sources of USD-relative rates.
#[async_trait::async_trait]
pub trait UsdRateProvider: Send + Sync {
    /// Fetches a full snapshot: units of each currency per 1 USD.
    async fn fetch_usd_rates(&self) -> Result<RateTable, ProviderError>;
}
