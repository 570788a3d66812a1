//! Repository port traits.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory mocks) implement these traits.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{CurrencyPair, PairId, SyncLogEntry};
use crate::error::RepoError;

/// An open rate-update transaction spanning one refresh run.
///
/// Staged writes become visible only on `commit`. Dropping the handle without
/// committing discards every staged write.
#[async_trait::async_trait]
pub trait RateUpdateTx: Send {
    /// Stages a new middle rate for `pair`.
    async fn stage_rate_update(&mut self, pair: &PairId, rate: Decimal) -> Result<(), RepoError>;

    /// Commits all staged writes atomically.
    async fn commit(self: Box<Self>) -> Result<(), RepoError>;

    /// Discards all staged writes.
    async fn rollback(self: Box<Self>) -> Result<(), RepoError>;
}

/// The storage port for currency pairs, offsets and the synchronization log.
#[async_trait::async_trait]
pub trait ExchangeRateRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Currency Pairs
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists pairs enabled for automatic updates.
    async fn list_active_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError>;

    /// Lists all pairs.
    async fn list_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError>;

    /// Creates a pair or updates its active flag.
    async fn upsert_pair(&self, pair: &PairId, is_active: bool)
    -> Result<CurrencyPair, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Offsets
    // ─────────────────────────────────────────────────────────────────────────────

    /// Loads every configured offset, parsed once.
    async fn load_offsets(&self) -> Result<HashMap<PairId, Decimal>, RepoError>;

    /// Gets the offset for a pair (zero when unset).
    async fn get_offset(&self, pair: &PairId) -> Result<Decimal, RepoError>;

    /// Overwrites the offset for a pair.
    async fn set_offset(&self, pair: &PairId, offset: Decimal) -> Result<(), RepoError>;

    /// Stores a zero offset iff none is set, and returns the current value.
    async fn save_default_offset(&self, pair: &PairId) -> Result<Decimal, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Synchronization Log
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a user-visible warning.
    async fn log_sync_warning(&self, message: &str) -> Result<SyncLogEntry, RepoError>;

    /// Lists the most recent entries, newest first.
    async fn list_sync_log(&self, limit: i64) -> Result<Vec<SyncLogEntry>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate Updates (MUST be atomic)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens the transaction that a refresh run stages its rates into.
    async fn begin_rate_update(&self) -> Result<Box<dyn RateUpdateTx>, RepoError>;
}
