//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use fx_types::{
    AppError, CreatePairRequest, CurrencyCode, ExchangeRateRepository, PairId, SetOffsetRequest,
};

use crate::RateUpdateService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R: ExchangeRateRepository> {
    pub service: Arc<RateUpdateService<R>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_code(raw: &str) -> Result<CurrencyCode, ApiError> {
    raw.parse::<CurrencyCode>()
        .map_err(|e| AppError::from(e).into())
}

fn parse_pair(raw: &str) -> Result<PairId, ApiError> {
    raw.parse::<PairId>().map_err(|e| AppError::from(e).into())
}

/// Health check endpoint.
pub async fn health<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "last_run": state.service.last_run_state()
    }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates
// ─────────────────────────────────────────────────────────────────────────────

/// Cross rate between two currencies.
#[tracing::instrument(skip(state))]
pub async fn get_cross_rate<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path((base, target)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let base = parse_code(&base)?;
    let target = parse_code(&target)?;

    let rate = state.service.cross_rate(base, target).await?;
    Ok(Json(rate))
}

/// Run a refresh now.
#[tracing::instrument(skip(state))]
pub async fn refresh<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.service.run_once().await.map_err(AppError::from)?;
    Ok(Json(report))
}

// ─────────────────────────────────────────────────────────────────────────────
// Pairs
// ─────────────────────────────────────────────────────────────────────────────

/// List all pairs with their persisted rates.
#[tracing::instrument(skip(state))]
pub async fn list_pairs<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let pairs = state.service.list_pairs().await?;
    Ok(Json(pairs))
}

/// Create or re-activate a pair.
#[tracing::instrument(skip(state), fields(source = %req.source, target = %req.target))]
pub async fn create_pair<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreatePairRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = state.service.create_pair(req).await?;
    Ok((StatusCode::CREATED, Json(pair)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Offsets
// ─────────────────────────────────────────────────────────────────────────────

/// Offset entries for every active pair.
#[tracing::instrument(skip(state))]
pub async fn offset_configuration<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.service.offset_configuration().await?;
    Ok(Json(settings))
}

#[tracing::instrument(skip(state), fields(pair = %pair))]
pub async fn get_offset<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(pair): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = parse_pair(&pair)?;

    let offset = state.service.get_offset(pair).await?;
    Ok(Json(offset))
}

#[tracing::instrument(skip(state), fields(pair = %pair, offset = %req.offset))]
pub async fn set_offset<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(pair): Path<String>,
    Json(req): Json<SetOffsetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = parse_pair(&pair)?;

    let offset = state.service.set_offset(pair, req.offset).await?;
    Ok(Json(offset))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync log
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for the sync log.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SyncLogQuery {
    /// Maximum number of entries (default 50, capped at 500)
    pub limit: Option<i64>,
}

#[tracing::instrument(skip(state))]
pub async fn sync_log<R: ExchangeRateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<SyncLogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.service.sync_log(query.limit.unwrap_or(50)).await?;
    Ok(Json(entries))
}
