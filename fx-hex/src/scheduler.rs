//! Periodic refresh job.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, instrument, warn};

use fx_types::{ExchangeRateRepository, RunError};

use crate::RateUpdateService;

/// Runs [`RateUpdateService::run_once`] on a fixed interval.
///
/// The first run starts immediately. A failed run is logged and the next tick
/// proceeds as usual.
pub struct RefreshScheduler<R: ExchangeRateRepository> {
    service: Arc<RateUpdateService<R>>,
    period: Duration,
}

impl<R: ExchangeRateRepository> RefreshScheduler<R> {
    pub fn new(service: Arc<RateUpdateService<R>>, period: Duration) -> Self {
        Self {
            service,
            // tokio rejects a zero period
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Runs until the task is dropped.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Runs until `shutdown` resolves. A run in flight is finished first.
    #[instrument(name = "RefreshScheduler", skip_all, fields(period_secs = self.period.as_secs()))]
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        info!("Starting exchange rate refresh scheduler");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        info!("Exchange rate refresh scheduler stopped");
    }

    async fn tick(&self) {
        match self.service.run_once().await {
            Ok(report) => info!(
                run_id = %report.run_id,
                updated = report.updated_count(),
                skipped = report.skipped_count(),
                rejected = report.rejected_count(),
                "Scheduled refresh finished"
            ),
            Err(RunError::AlreadyRunning) => {
                warn!("Previous refresh still running, skipping this tick")
            }
            Err(e) => error!(error = %e, "Scheduled refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange_rates::{RateCache, StaticRateProvider};
    use fx_types::RunState;
    use rust_decimal_macros::dec;

    use crate::service_tests::tests::MockRepo;

    fn service_over(repo: MockRepo) -> Arc<RateUpdateService<MockRepo>> {
        let cache = Arc::new(RateCache::new(Arc::new(StaticRateProvider::development())));
        Arc::new(RateUpdateService::new(repo, cache))
    }

    #[tokio::test]
    async fn test_runs_on_every_tick_until_shutdown() {
        let service = service_over(MockRepo::new().with_pair("USD", "EUR", true));
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_millis(20));

        scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(70)))
            .await;

        assert!(service.repo().transactions_begun() >= 2);
        assert_eq!(service.last_run_state(), RunState::Committed);
        assert_eq!(service.repo().rate_of("USD", "EUR"), Some(dec!(0.92)));
    }

    #[tokio::test]
    async fn test_failed_runs_do_not_stop_the_loop() {
        let service = service_over(
            MockRepo::new()
                .with_pair("USD", "EUR", true)
                .failing_commit(),
        );
        let scheduler = RefreshScheduler::new(service.clone(), Duration::from_millis(20));

        scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(70)))
            .await;

        assert!(service.repo().transactions_begun() >= 2);
        assert_eq!(service.last_run_state(), RunState::RolledBack);
    }

    #[tokio::test]
    async fn test_zero_period_is_clamped() {
        let service = service_over(MockRepo::new());
        let scheduler = RefreshScheduler::new(service, Duration::ZERO);

        assert_eq!(scheduler.period, Duration::from_millis(1));
    }
}
