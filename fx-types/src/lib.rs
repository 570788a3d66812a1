//! # FX Types
//!
//! Domain types and port traits for the exchange rate refresh service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, PairId, RateTable, RunReport)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CurrencyCode, CurrencyPair, OffsetSetting, PairId, PairOutcome, RATE_SCALE, RateTable,
    RunReport, RunState, SkipReason, SyncLogEntry, SyncLogLevel, round_half_up, round_rate,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError, RunError};
pub use ports::{
    ExchangeRateRepository, ProviderError, RateError, RateUpdateTx, UsdRateProvider,
};
pub use rust_decimal::Decimal;
