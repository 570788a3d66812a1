//! USD-Relative Rate Providers and Cross-Rate Cache
//!
//! Every upstream source in this library answers one question: how many units
//! of each currency equal 1 USD. [`RateCache`] turns such a table into an
//! on-demand calculator for arbitrary pairs.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use exchange_rates::{RateCache, StaticRateProvider};
//!
//! let cache = RateCache::new(Arc::new(StaticRateProvider::development()));
//!
//! // 1 USD = 1.37 CAD and 1 USD = 0.92 EUR, so 1 CAD = (1 / 1.37) * 0.92 EUR
//! let rate = cache.cross_rate("cad", "eur").await?;
//! ```

mod cache;
mod fixed;
mod open_er_api;

pub use cache::RateCache;
pub use fixed::StaticRateProvider;
pub use open_er_api::{DEFAULT_OPEN_ER_API_URL, OpenErApiProvider};
