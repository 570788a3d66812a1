//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use exchange_rates::DEFAULT_OPEN_ER_API_URL;

/// Source of USD-relative rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// open.er-api.com over HTTP
    OpenErApi,
    /// Fixed development table, no network access
    Static,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open-er-api" => Ok(Self::OpenErApi),
            "static" => Ok(Self::Static),
            other => anyhow::bail!("Unknown FX_PROVIDER {:?} (expected open-er-api or static)", other),
        }
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub provider: ProviderKind,
    pub provider_url: String,
    pub provider_timeout: Duration,
    pub refresh_enabled: bool,
    pub refresh_interval: Duration,
    pub fresh_cache_per_run: bool,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let provider = var("FX_PROVIDER", "open-er-api").parse()?;
        let provider_url = var("FX_PROVIDER_URL", DEFAULT_OPEN_ER_API_URL);
        let provider_timeout = Duration::from_secs(parse_secs(
            "FX_PROVIDER_TIMEOUT_SECS",
            &var("FX_PROVIDER_TIMEOUT_SECS", "30"),
        )?);

        let refresh_enabled = parse_bool("FX_REFRESH_ENABLED", &var("FX_REFRESH_ENABLED", "true"))?;
        let refresh_interval = Duration::from_secs(parse_secs(
            "FX_REFRESH_INTERVAL_SECS",
            &var("FX_REFRESH_INTERVAL_SECS", "3600"),
        )?);
        let fresh_cache_per_run = parse_bool(
            "FX_FRESH_CACHE_PER_RUN",
            &var("FX_FRESH_CACHE_PER_RUN", "true"),
        )?;

        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            provider,
            provider_url,
            provider_timeout,
            refresh_enabled,
            refresh_interval,
            fresh_cache_per_run,
            otlp_endpoint,
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> anyhow::Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => anyhow::bail!("{} must be greater than zero", key),
        Ok(secs) => Ok(secs),
        Err(e) => anyhow::bail!("Invalid {}: {}", key, e),
    }
}

fn parse_bool(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("Invalid {}: {:?} is not a boolean", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.provider, ProviderKind::OpenErApi);
        assert_eq!(config.provider_url, DEFAULT_OPEN_ER_API_URL);
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert!(config.refresh_enabled);
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert!(config.fresh_cache_per_run);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_database_url_is_required() {
        let err = config_from(&[]).unwrap_err();

        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/fx"),
            ("PORT", "8080"),
            ("FX_PROVIDER", "Static"),
            ("FX_REFRESH_ENABLED", "off"),
            ("FX_REFRESH_INTERVAL_SECS", "60"),
            ("FX_FRESH_CACHE_PER_RUN", "false"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.provider, ProviderKind::Static);
        assert!(!config.refresh_enabled);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert!(!config.fresh_cache_per_run);
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("FX_REFRESH_INTERVAL_SECS", "0"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("FX_REFRESH_INTERVAL_SECS"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(config_from(&[("DATABASE_URL", "x"), ("FX_PROVIDER", "ecb")]).is_err());
    }
}
