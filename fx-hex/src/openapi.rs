//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use utoipa::OpenApi;

use fx_types::dto::{CreatePairRequest, CrossRateResponse, OffsetResponse, SetOffsetRequest};
use fx_types::{
    CurrencyCode, CurrencyPair, OffsetSetting, PairId, PairOutcome, RunReport, RunState,
    SkipReason, SyncLogEntry, SyncLogLevel,
};

use crate::inbound::handlers::SyncLogQuery;

// Documentation-only stand-ins for the generic handlers

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy", "last_run": "COMMITTED"}))
    )
)]
async fn health() {}

/// Cross rate between two currencies
#[utoipa::path(
    get,
    path = "/api/rates/{base}/{target}",
    tag = "rates",
    params(
        ("base" = String, Path, description = "Currency being converted from", example = "CAD"),
        ("target" = String, Path, description = "Currency being converted to", example = "EUR")
    ),
    responses(
        (status = 200, description = "Units of target per 1 unit of base", body = CrossRateResponse),
        (status = 400, description = "Invalid currency code"),
        (status = 404, description = "No rate available for one of the currencies")
    )
)]
async fn get_cross_rate() {}

/// Run a refresh now
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "rates",
    responses(
        (status = 200, description = "Run committed", body = RunReport),
        (status = 409, description = "A run is already in progress"),
        (status = 500, description = "Run failed, nothing was committed")
    )
)]
async fn refresh() {}

/// List all currency pairs
#[utoipa::path(
    get,
    path = "/api/pairs",
    tag = "pairs",
    responses(
        (status = 200, description = "Pairs with their persisted middle rates", body = Vec<CurrencyPair>)
    )
)]
async fn list_pairs() {}

/// Create or re-activate a currency pair
#[utoipa::path(
    post,
    path = "/api/pairs",
    tag = "pairs",
    request_body = CreatePairRequest,
    responses(
        (status = 201, description = "Pair stored", body = CurrencyPair),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_pair() {}

/// Offset entries for every active pair
#[utoipa::path(
    get,
    path = "/api/offsets",
    tag = "offsets",
    responses(
        (status = 200, description = "Offset configuration", body = Vec<OffsetSetting>)
    )
)]
async fn offset_configuration() {}

/// Get the offset of a pair
#[utoipa::path(
    get,
    path = "/api/offsets/{pair}",
    tag = "offsets",
    params(
        ("pair" = String, Path, description = "Pair id", example = "USD->EUR")
    ),
    responses(
        (status = 200, description = "Current offset (0 when never set)", body = OffsetResponse),
        (status = 400, description = "Invalid pair id")
    )
)]
async fn get_offset() {}

/// Overwrite the offset of a pair
#[utoipa::path(
    put,
    path = "/api/offsets/{pair}",
    tag = "offsets",
    params(
        ("pair" = String, Path, description = "Pair id", example = "USD->EUR")
    ),
    request_body = SetOffsetRequest,
    responses(
        (status = 200, description = "Offset stored", body = OffsetResponse),
        (status = 400, description = "Invalid pair id or offset")
    )
)]
async fn set_offset() {}

/// Latest synchronization log entries
#[utoipa::path(
    get,
    path = "/api/sync-log",
    tag = "sync-log",
    params(SyncLogQuery),
    responses(
        (status = 200, description = "Newest entries first", body = Vec<SyncLogEntry>),
        (status = 400, description = "Invalid limit")
    )
)]
async fn sync_log() {}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FX Rate Refresh API",
        version = "0.1.0",
        description = "Maintains currency-pair middle rates derived from a USD-relative rate table"
    ),
    paths(
        health,
        get_cross_rate,
        refresh,
        list_pairs,
        create_pair,
        offset_configuration,
        get_offset,
        set_offset,
        sync_log,
    ),
    components(
        schemas(
            CurrencyCode,
            PairId,
            CurrencyPair,
            OffsetSetting,
            CrossRateResponse,
            CreatePairRequest,
            SetOffsetRequest,
            OffsetResponse,
            RunReport,
            RunState,
            PairOutcome,
            SkipReason,
            SyncLogEntry,
            SyncLogLevel,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Cross rates and refresh runs"),
        (name = "pairs", description = "Maintained currency pairs"),
        (name = "offsets", description = "Per-pair manual offsets"),
        (name = "sync-log", description = "Operator-facing synchronization log"),
    )
)]
pub struct ApiDoc;
