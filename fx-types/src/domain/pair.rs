//! Currency pair domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::CurrencyCode;
use crate::error::DomainError;

const PAIR_SEPARATOR: &str = "->";

/// Identity of a maintained conversion, rendered as `"SRC->TGT"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairId {
    source: CurrencyCode,
    target: CurrencyCode,
}

// utoipa 5 rejects container-level `value_type` on structs with named fields,
// so the string schema (`value_type = String, example = "USD->EUR"`) is spelled out here.
impl utoipa::PartialSchema for PairId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::Type::String)
            .examples(["USD->EUR"])
            .into()
    }
}

impl ToSchema for PairId {}

impl PairId {
    pub fn new(source: impl Into<CurrencyCode>, target: impl Into<CurrencyCode>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn source(&self) -> &CurrencyCode {
        &self.source
    }

    pub fn target(&self) -> &CurrencyCode {
        &self.target
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.source, PAIR_SEPARATOR, self.target)
    }
}

impl std::str::FromStr for PairId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s
            .split_once(PAIR_SEPARATOR)
            .ok_or_else(|| DomainError::InvalidPairId(s.to_string()))?;
        let source: CurrencyCode = source
            .parse()
            .map_err(|_| DomainError::InvalidPairId(s.to_string()))?;
        let target: CurrencyCode = target
            .parse()
            .map_err(|_| DomainError::InvalidPairId(s.to_string()))?;
        Ok(Self { source, target })
    }
}

impl TryFrom<String> for PairId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PairId> for String {
    fn from(id: PairId) -> Self {
        id.to_string()
    }
}

/// A currency pair whose rate is maintained by the refresh job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyPair {
    pub id: PairId,
    pub is_active: bool,
    /// Last persisted rate (units of target per unit of source).
    #[schema(value_type = Option<String>, example = "0.94")]
    pub middle_rate: Option<Decimal>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CurrencyPair {
    /// Creates an active pair with no persisted rate yet.
    pub fn new(id: PairId) -> Self {
        Self {
            id,
            is_active: true,
            middle_rate: None,
            updated_at: None,
        }
    }

    pub fn source(&self) -> &CurrencyCode {
        self.id.source()
    }

    pub fn target(&self) -> &CurrencyCode {
        self.id.target()
    }
}

/// One entry of the offset configuration screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OffsetSetting {
    pub pair: PairId,
    #[schema(example = "Offset USD->EUR")]
    pub label: String,
    #[schema(value_type = String, example = "0.0")]
    pub value: Decimal,
}

impl OffsetSetting {
    pub fn new(pair: PairId, value: Decimal) -> Self {
        let label = format!("Offset {}", pair);
        Self { pair, label, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_id_display() {
        let id = PairId::new("usd", "eur");
        assert_eq!(id.to_string(), "USD->EUR");
    }

    #[test]
    fn test_pair_id_parse() {
        let id: PairId = "cad->Eur".parse().unwrap();
        assert_eq!(id.source().as_str(), "CAD");
        assert_eq!(id.target().as_str(), "EUR");
    }

    #[test]
    fn test_pair_id_parse_rejects_malformed() {
        assert!(matches!(
            "USDEUR".parse::<PairId>(),
            Err(DomainError::InvalidPairId(_))
        ));
        assert!("->EUR".parse::<PairId>().is_err());
        assert!("USD->".parse::<PairId>().is_err());
    }

    #[test]
    fn test_pair_id_serializes_as_string() {
        let id = PairId::new("USD", "CAD");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"USD->CAD\"");
        let back: PairId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_offset_setting_label() {
        let setting = OffsetSetting::new(PairId::new("USD", "EUR"), Decimal::ZERO);
        assert_eq!(setting.label, "Offset USD->EUR");
    }
}
