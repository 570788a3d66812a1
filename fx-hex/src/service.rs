//! Rate Update Application Service
//!
//! Orchestrates a refresh run through the repository port and the shared
//! cross-rate converter. Contains NO infrastructure logic.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use exchange_rates::RateCache;
use fx_types::{
    AppError, CreatePairRequest, CrossRateResponse, CurrencyCode, CurrencyPair,
    ExchangeRateRepository, OffsetResponse, OffsetSetting, PairId, PairOutcome, RateError,
    RateUpdateTx, RunError, RunReport, RunState, SkipReason, SyncLogEntry, round_rate,
};

/// Upper bound for a single sync log page.
pub const MAX_SYNC_LOG_LIMIT: i64 = 500;

/// Application service for exchange rate maintenance.
///
/// Generic over `R: ExchangeRateRepository` - the adapter is injected at compile time.
/// The converter is shared, so ad-hoc rate queries and scheduled runs see the
/// same cached USD table.
pub struct RateUpdateService<R: ExchangeRateRepository> {
    repo: R,
    converter: Arc<RateCache>,
    fresh_cache_per_run: bool,
    run_state: Mutex<RunState>,
}

/// How one pair resolved before anything is staged.
enum Resolution {
    Accepted(Decimal),
    Rejected(Decimal),
    Unavailable,
    Overflow,
}

impl<R: ExchangeRateRepository> RateUpdateService<R> {
    /// Creates a service that clears the converter at the start of every run.
    pub fn new(repo: R, converter: Arc<RateCache>) -> Self {
        Self {
            repo,
            converter,
            fresh_cache_per_run: true,
            run_state: Mutex::new(RunState::NotStarted),
        }
    }

    /// Keeps cached USD rates across runs when `false`.
    pub fn with_fresh_cache_per_run(mut self, fresh: bool) -> Self {
        self.fresh_cache_per_run = fresh;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn converter(&self) -> &Arc<RateCache> {
        &self.converter
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Batch refresh
    // ─────────────────────────────────────────────────────────────────────────────

    /// Recomputes and persists the middle rate of every active pair.
    ///
    /// Pairs without a derivable rate keep their value and are reported as
    /// skipped. Pairs whose offset-adjusted rate is not strictly positive keep
    /// their value and leave a warning in the sync log. Any persistence failure
    /// discards every staged update.
    #[instrument(name = "RateUpdateRun", skip(self))]
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let mut state = self
            .run_state
            .try_lock()
            .map_err(|_| RunError::AlreadyRunning)?;
        *state = RunState::InProgress;

        let mut report = RunReport::start();
        info!(run_id = %report.run_id, "Starting exchange rate refresh");

        if self.fresh_cache_per_run {
            self.converter.clear().await;
        }

        let mut warnings = Vec::new();
        let result = self.apply_rates(&mut report, &mut warnings).await;

        // Sync log entries are written outside the rate transaction.
        self.flush_sync_log(warnings).await;

        match result {
            Ok(()) => {
                report.finish(RunState::Committed);
                *state = RunState::Committed;
                info!(
                    run_id = %report.run_id,
                    updated = report.updated_count(),
                    skipped = report.skipped_count(),
                    rejected = report.rejected_count(),
                    "Exchange rate refresh committed"
                );
                Ok(report)
            }
            Err(e) => {
                // Load failures end here too; nothing was staged, so the run
                // reports RolledBack like any other uncommitted run.
                *state = RunState::RolledBack;
                error!(run_id = %report.run_id, error = %e, "Exchange rate refresh failed");
                Err(e)
            }
        }
    }

    async fn apply_rates(
        &self,
        report: &mut RunReport,
        warnings: &mut Vec<String>,
    ) -> Result<(), RunError> {
        let pairs = self.repo.list_active_pairs().await.map_err(RunError::Load)?;
        let offsets = self.repo.load_offsets().await.map_err(RunError::Load)?;

        let mut tx = self
            .repo
            .begin_rate_update()
            .await
            .map_err(RunError::RolledBack)?;

        for pair in &pairs {
            let offset = offsets.get(&pair.id).copied().unwrap_or(Decimal::ZERO);

            match self.resolve(pair, offset).await {
                Resolution::Unavailable => {
                    info!(
                        "Couldn't calculate exchange rate for {} -> {}. Skipping.",
                        pair.source(),
                        pair.target()
                    );
                    report.record(PairOutcome::Skipped {
                        pair: pair.id.clone(),
                        reason: SkipReason::NoRateAvailable,
                    });
                }
                Resolution::Overflow => {
                    let message = format!(
                        "Exchange rate for {} overflows with offset {} and thus wasn't set",
                        pair.id, offset
                    );
                    warn!("{}", message);
                    warnings.push(message);
                    report.record(PairOutcome::Skipped {
                        pair: pair.id.clone(),
                        reason: SkipReason::RateOverflow,
                    });
                }
                Resolution::Rejected(rate) => {
                    let message = format!(
                        "Exchange rate for {} would be negative ({}) and thus wasn't set",
                        pair.id, rate
                    );
                    warn!("{}", message);
                    warnings.push(message);
                    report.record(PairOutcome::Rejected {
                        pair: pair.id.clone(),
                        rate,
                    });
                }
                Resolution::Accepted(rate) => {
                    if let Err(e) = tx.stage_rate_update(&pair.id, rate).await {
                        error!(pair = %pair.id, error = %e, "Failed to stage rate update, rolling back");
                        rollback(tx).await;
                        return Err(RunError::RolledBack(e));
                    }
                    report.record(PairOutcome::Updated {
                        pair: pair.id.clone(),
                        rate,
                    });
                }
            }
        }

        tx.commit().await.map_err(RunError::RolledBack)
    }

    async fn resolve(&self, pair: &CurrencyPair, offset: Decimal) -> Resolution {
        let cross = match self
            .converter
            .cross_rate(pair.source().clone(), pair.target().clone())
            .await
        {
            Ok(cross) => cross,
            Err(RateError::NoRateAvailable { .. }) => return Resolution::Unavailable,
        };

        let Some(adjusted) = cross.checked_add(offset) else {
            return Resolution::Overflow;
        };
        let rate = round_rate(adjusted);
        if rate > Decimal::ZERO {
            Resolution::Accepted(rate)
        } else {
            Resolution::Rejected(rate)
        }
    }

    async fn flush_sync_log(&self, warnings: Vec<String>) {
        for message in warnings {
            if let Err(e) = self.repo.log_sync_warning(&message).await {
                error!(error = %e, message = %message, "Failed to write sync log entry");
            }
        }
    }

    /// State of the latest run; `InProgress` while one is executing.
    pub fn last_run_state(&self) -> RunState {
        match self.run_state.try_lock() {
            Ok(state) => *state,
            Err(_) => RunState::InProgress,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// Ad-hoc cross rate through the shared converter.
    pub async fn cross_rate(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<CrossRateResponse, AppError> {
        let rate = self
            .converter
            .cross_rate(base.clone(), target.clone())
            .await?;
        Ok(CrossRateResponse { base, target, rate })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pairs
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_pairs(&self) -> Result<Vec<CurrencyPair>, AppError> {
        self.repo.list_pairs().await.map_err(Into::into)
    }

    /// Creates a pair, or updates the active flag of an existing one.
    pub async fn create_pair(&self, req: CreatePairRequest) -> Result<CurrencyPair, AppError> {
        if req.source.is_empty() || req.target.is_empty() {
            return Err(AppError::BadRequest(
                "Source and target currency are required".into(),
            ));
        }

        self.repo
            .upsert_pair(&req.pair_id(), req.is_active)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Offsets
    // ─────────────────────────────────────────────────────────────────────────────

    /// One offset entry per active pair, persisting the default where none exists yet.
    pub async fn offset_configuration(&self) -> Result<Vec<OffsetSetting>, AppError> {
        let pairs = self.repo.list_active_pairs().await?;

        let mut settings = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let value = self.repo.save_default_offset(&pair.id).await?;
            settings.push(OffsetSetting::new(pair.id, value));
        }
        Ok(settings)
    }

    pub async fn get_offset(&self, pair: PairId) -> Result<OffsetResponse, AppError> {
        let offset = self.repo.get_offset(&pair).await?;
        Ok(OffsetResponse { pair, offset })
    }

    pub async fn set_offset(
        &self,
        pair: PairId,
        offset: Decimal,
    ) -> Result<OffsetResponse, AppError> {
        self.repo.set_offset(&pair, offset).await?;
        info!(pair = %pair, offset = %offset, "Offset updated");
        Ok(OffsetResponse { pair, offset })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sync log
    // ─────────────────────────────────────────────────────────────────────────────

    /// Newest entries first.
    pub async fn sync_log(&self, limit: i64) -> Result<Vec<SyncLogEntry>, AppError> {
        if limit < 1 {
            return Err(AppError::BadRequest("Limit must be positive".into()));
        }

        self.repo
            .list_sync_log(limit.min(MAX_SYNC_LOG_LIMIT))
            .await
            .map_err(Into::into)
    }
}

async fn rollback(tx: Box<dyn RateUpdateTx>) {
    if let Err(e) = tx.rollback().await {
        error!(error = %e, "Rollback failed");
    }
}
