//! Rates by Exchange Rate API (<https://www.exchangerate-api.com>).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use fx_types::{CurrencyCode, ProviderError, RateTable, UsdRateProvider};

/// Open access endpoint returning every supported currency against USD.
pub const DEFAULT_OPEN_ER_API_URL: &str = "https://open.er-api.com/v6/latest/USD";

#[derive(Deserialize, Debug)]
struct LatestRatesResponse {
    result: Option<String>,
    provider: Option<String>,
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<HashMap<String, Decimal>>,
}

/// Fetches the full USD table with one GET per call. No retries.
pub struct OpenErApiProvider {
    url: String,
    http: Client,
}

impl OpenErApiProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }

    /// Creates a provider whose requests give up after `timeout`.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for OpenErApiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_ER_API_URL)
    }
}

#[async_trait]
impl UsdRateProvider for OpenErApiProvider {
    #[instrument(name = "OpenErApiFetch", skip(self), fields(url = %self.url))]
    async fn fetch_usd_rates(&self) -> Result<RateTable, ProviderError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(ProviderError::EmptyBody);
        }

        let parsed: LatestRatesResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        if parsed.result.as_deref() == Some("error") {
            return Err(ProviderError::Upstream(
                parsed.error_type.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        let rates = parsed
            .rates
            .ok_or_else(|| ProviderError::Parse("response has no rates".to_string()))?;

        debug!(
            provider = parsed.provider.as_deref().unwrap_or("-"),
            base = parsed.base_code.as_deref().unwrap_or("-"),
            last_update = parsed.time_last_update_unix.unwrap_or_default(),
            codes = rates.len(),
            "Fetched USD rates"
        );

        Ok(rates
            .into_iter()
            .map(|(code, value)| (CurrencyCode::new(code), value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider_for(server: &MockServer) -> OpenErApiProvider {
        OpenErApiProvider::new(format!("{}/v6/latest/USD", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_success() {
        let mock_response = r#"{
            "result": "success",
            "provider": "https://www.exchangerate-api.com",
            "documentation": "https://www.exchangerate-api.com/docs/free",
            "terms_of_use": "https://www.exchangerate-api.com/terms",
            "time_last_update_unix": 1716163351,
            "time_last_update_utc": "Mon, 20 May 2024 00:02:31 +0000",
            "time_next_update_unix": 1716250741,
            "time_next_update_utc": "Tue, 21 May 2024 00:19:01 +0000",
            "time_eol_unix": 0,
            "base_code": "USD",
            "rates": {"USD": 1, "EUR": 0.94, "CAD": 1.37, "inr": 83.12}
        }"#;
        let server = create_mock_server(200, mock_response).await;

        let rates = provider_for(&server).fetch_usd_rates().await.unwrap();

        assert_eq!(rates.len(), 4);
        assert_eq!(rates[&CurrencyCode::new("USD")], dec!(1));
        assert_eq!(rates[&CurrencyCode::new("EUR")], dec!(0.94));
        assert_eq!(rates[&CurrencyCode::new("CAD")], dec!(1.37));
        assert_eq!(rates[&CurrencyCode::new("INR")], dec!(83.12));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_http_error() {
        let server = create_mock_server(503, "Service Unavailable").await;

        let err = provider_for(&server).fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::Status(503)));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_empty_body() {
        let server = create_mock_server(200, "").await;

        let err = provider_for(&server).fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::EmptyBody));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_malformed_json() {
        let server = create_mock_server(200, "{\"rates\": [1, 2").await;

        let err = provider_for(&server).fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_missing_rates() {
        let server = create_mock_server(200, r#"{"result": "success"}"#).await;

        let err = provider_for(&server).fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_upstream_error() {
        let server =
            create_mock_server(200, r#"{"result": "error", "error-type": "unsupported-code"}"#)
                .await;

        let err = provider_for(&server).fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::Upstream(ref t) if t == "unsupported-code"));
    }

    #[tokio::test]
    async fn test_fetch_usd_rates_transport_error() {
        let provider = OpenErApiProvider::new("http://127.0.0.1:1/v6/latest/USD");

        let err = provider.fetch_usd_rates().await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_default_url() {
        assert_eq!(OpenErApiProvider::default().url(), DEFAULT_OPEN_ER_API_URL);
    }
}
