//! # FX Client SDK
//!
//! A typed Rust client for the exchange rate refresh API.

use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fx_types::{
    CreatePairRequest, CrossRateResponse, CurrencyCode, CurrencyPair, OffsetResponse,
    OffsetSetting, PairId, RunReport, RunState, SetOffsetRequest, SyncLogEntry,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub last_run: RunState,
}

/// FX API client.
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Health and state of the latest refresh run.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get(&["health"]).await
    }

    /// Units of `target` per 1 unit of `base`.
    pub async fn cross_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
    ) -> Result<CrossRateResponse, ClientError> {
        self.get(&["api", "rates", base.as_str(), target.as_str()])
            .await
    }

    /// Lists all pairs with their persisted rates.
    pub async fn list_pairs(&self) -> Result<Vec<CurrencyPair>, ClientError> {
        self.get(&["api", "pairs"]).await
    }

    /// Creates a pair or changes its active flag.
    pub async fn create_pair(
        &self,
        source: CurrencyCode,
        target: CurrencyCode,
        is_active: bool,
    ) -> Result<CurrencyPair, ClientError> {
        let req = CreatePairRequest {
            source,
            target,
            is_active,
        };
        self.send(reqwest::Method::POST, &["api", "pairs"], &req)
            .await
    }

    /// Offset entries for every active pair.
    pub async fn offset_configuration(&self) -> Result<Vec<OffsetSetting>, ClientError> {
        self.get(&["api", "offsets"]).await
    }

    pub async fn get_offset(&self, pair: &PairId) -> Result<OffsetResponse, ClientError> {
        self.get(&["api", "offsets", &pair.to_string()]).await
    }

    pub async fn set_offset(
        &self,
        pair: &PairId,
        offset: Decimal,
    ) -> Result<OffsetResponse, ClientError> {
        let req = SetOffsetRequest { offset };
        self.send(
            reqwest::Method::PUT,
            &["api", "offsets", &pair.to_string()],
            &req,
        )
        .await
    }

    /// Triggers a refresh run and waits for its report.
    pub async fn refresh(&self) -> Result<RunReport, ClientError> {
        self.send(reqwest::Method::POST, &["api", "refresh"], &serde_json::json!({}))
            .await
    }

    /// Newest sync log entries first.
    pub async fn sync_log(&self, limit: i64) -> Result<Vec<SyncLogEntry>, ClientError> {
        let mut url = self.url(&["api", "sync-log"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let resp = self.http.get(self.url(segments)?).send().await?;
        self.handle_response(resp).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .request(method, self.url(segments)?)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
