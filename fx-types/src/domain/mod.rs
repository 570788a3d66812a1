//! Domain models for the exchange rate refresh service.

pub mod currency;
pub mod pair;
pub mod rate;
pub mod run;
pub mod sync_log;

pub use currency::CurrencyCode;
pub use pair::{CurrencyPair, OffsetSetting, PairId};
pub use rate::{RATE_SCALE, RateTable, round_half_up, round_rate};
pub use run::{PairOutcome, RunReport, RunState, SkipReason};
pub use sync_log::{SyncLogEntry, SyncLogLevel};
