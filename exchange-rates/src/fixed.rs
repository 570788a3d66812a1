//! Fixed USD-relative rates for development and testing.

use async_trait::async_trait;
use rust_decimal::Decimal;

use fx_types::{CurrencyCode, ProviderError, RateTable, UsdRateProvider};

/// Builds a [`RateTable`] from `CODE => (mantissa, scale)` entries.
macro_rules! usd_table {
    ($($code:literal => ($mantissa:expr, $scale:expr)),* $(,)?) => {{
        let mut table = RateTable::new();
        $(table.insert(CurrencyCode::new($code), Decimal::new($mantissa, $scale));)*
        table
    }};
}

/// Provider that always returns the same table without network access.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    rates: RateTable,
}

impl StaticRateProvider {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    /// Table used when running locally without the upstream API.
    pub fn development() -> Self {
        Self::new(usd_table! {
            "USD" => (1, 0),
            "EUR" => (92, 2),
            "GBP" => (79, 2),
            "INR" => (8312, 2),
            "CAD" => (137, 2),
        })
    }
}

#[async_trait]
impl UsdRateProvider for StaticRateProvider {
    async fn fetch_usd_rates(&self) -> Result<RateTable, ProviderError> {
        Ok(self.rates.clone())
    }
}
