//! Currency code with uppercase normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// ISO-style currency code, always stored trimmed and uppercase.
///
/// Codes are case-insensitive on input: `"eur"`, `" Eur "` and `"EUR"` are the
/// same code. No further validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(from = "String", into = "String")]
#[schema(value_type = String, example = "EUR")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a code by normalizing the input.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = Self::new(s);
        if code.is_empty() {
            return Err(DomainError::InvalidCurrencyCode(s.to_string()));
        }
        Ok(code)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalized_to_uppercase() {
        assert_eq!(CurrencyCode::new("eur").as_str(), "EUR");
        assert_eq!(CurrencyCode::new(" cad ").as_str(), "CAD");
        assert_eq!(CurrencyCode::new("Usd"), CurrencyCode::new("USD"));
    }

    #[test]
    fn test_parse_rejects_empty_code() {
        assert!("  ".parse::<CurrencyCode>().is_err());
        assert_eq!("gbp".parse::<CurrencyCode>().unwrap().as_str(), "GBP");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let code: CurrencyCode = serde_json::from_str("\"inr\"").unwrap();
        assert_eq!(code.as_str(), "INR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"INR\"");
    }
}
