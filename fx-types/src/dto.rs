//! Data Transfer Objects (DTOs) for requests and responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, PairId};

// ─────────────────────────────────────────────────────────────────────────────
// Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Cross rate between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CrossRateResponse {
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    /// Units of `target` per 1 unit of `base`
    #[schema(value_type = String, example = "0.94")]
    pub rate: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pair DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create (or re-activate) a currency pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePairRequest {
    #[schema(example = "USD")]
    pub source: CurrencyCode,
    #[schema(example = "EUR")]
    pub target: CurrencyCode,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreatePairRequest {
    pub fn pair_id(&self) -> PairId {
        PairId::new(self.source.clone(), self.target.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Offset DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to overwrite a pair's offset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetOffsetRequest {
    /// Additive adjustment applied to the computed rate
    #[schema(value_type = String, example = "0.01")]
    pub offset: Decimal,
}

/// A pair's current offset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OffsetResponse {
    pub pair: PairId,
    #[schema(value_type = String, example = "0.01")]
    pub offset: Decimal,
}
