//! Lazily-populated cache of USD-relative rates with cross-rate derivation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use fx_types::{CurrencyCode, ProviderError, RateError, RateTable, UsdRateProvider, round_rate};

/// Converts a USD-relative rate table into rates for arbitrary pairs.
///
/// A miss on either code pulls a full snapshot from the provider and merges it
/// in, so one fetch usually primes every later lookup. The lock is held across
/// "check, fetch, merge, read", so concurrent callers never interleave merges.
pub struct RateCache {
    provider: Arc<dyn UsdRateProvider>,
    rates: Mutex<RateTable>,
}

impl RateCache {
    pub fn new(provider: Arc<dyn UsdRateProvider>) -> Self {
        Self {
            provider,
            rates: Mutex::new(RateTable::new()),
        }
    }

    /// Units of `request` per 1 unit of `base`, rounded half-up to the rate scale.
    ///
    /// Example: 1 USD = 1.37 CAD and 1 USD = 0.94 EUR, so
    /// 1 CAD = 1 / 1.37 USD = (1 / 1.37) * 0.94 EUR.
    ///
    /// Fails with [`RateError::NoRateAvailable`] when either code is unknown
    /// after a fetch attempt, or resolved to a zero or negative value.
    pub async fn cross_rate(
        &self,
        base: impl Into<CurrencyCode>,
        request: impl Into<CurrencyCode>,
    ) -> Result<Decimal, RateError> {
        let base: CurrencyCode = base.into();
        let request: CurrencyCode = request.into();

        let mut rates = self.rates.lock().await;
        for code in [&base, &request] {
            if rates.contains_key(code) {
                continue;
            }
            debug!(currency = %code, "Rate cache miss");
            match self.provider.fetch_usd_rates().await {
                Ok(table) => merge(&mut rates, table),
                Err(e) => warn!(currency = %code, error = %e, "Error when retrieving USD rates"),
            }
        }

        let base_usd = positive(rates.get(&base));
        let request_usd = positive(rates.get(&request));

        match (base_usd, request_usd) {
            (Some(base_usd), Some(request_usd)) => request_usd
                .checked_div(base_usd)
                .map(round_rate)
                .ok_or(RateError::NoRateAvailable { base, request }),
            _ => Err(RateError::NoRateAvailable { base, request }),
        }
    }

    /// Fetches a snapshot now and merges it, returning the number of codes received.
    pub async fn refresh(&self) -> Result<usize, ProviderError> {
        let mut rates = self.rates.lock().await;
        let table = self.provider.fetch_usd_rates().await?;
        let received = table.len();
        merge(&mut rates, table);
        Ok(received)
    }

    /// Forgets every cached code.
    pub async fn clear(&self) {
        self.rates.lock().await.clear();
    }

    /// Copy of the cached table.
    pub async fn snapshot(&self) -> RateTable {
        self.rates.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rates.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rates.lock().await.is_empty()
    }
}

fn merge(rates: &mut RateTable, table: RateTable) {
    debug!(codes = table.len(), "Merging USD rate snapshot");
    rates.extend(table);
}

fn positive(value: Option<&Decimal>) -> Option<Decimal> {
    value.copied().filter(|v| *v > Decimal::ZERO)
}
