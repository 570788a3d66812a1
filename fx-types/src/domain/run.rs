//! Batch refresh run model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::pair::PairId;

/// Lifecycle of one batch refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    NotStarted,
    InProgress,
    Committed,
    RolledBack,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::NotStarted => "NOT_STARTED",
            RunState::InProgress => "IN_PROGRESS",
            RunState::Committed => "COMMITTED",
            RunState::RolledBack => "ROLLED_BACK",
        };
        write!(f, "{}", s)
    }
}

/// Why a pair kept its persisted rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    NoRateAvailable,
    /// Cross rate plus offset is outside the decimal range.
    RateOverflow,
}

/// Per-pair result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairOutcome {
    /// New rate staged (and committed if the run committed).
    Updated {
        pair: PairId,
        #[schema(value_type = String)]
        rate: Decimal,
    },
    /// No usable rate could be derived.
    Skipped { pair: PairId, reason: SkipReason },
    /// Offset-adjusted rate was not strictly positive.
    Rejected {
        pair: PairId,
        #[schema(value_type = String)]
        rate: Decimal,
    },
}

impl PairOutcome {
    pub fn pair(&self) -> &PairId {
        match self {
            PairOutcome::Updated { pair, .. }
            | PairOutcome::Skipped { pair, .. }
            | PairOutcome::Rejected { pair, .. } => pair,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunReport {
    pub run_id: Uuid,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<PairOutcome>,
}

impl RunReport {
    /// Starts an in-progress report.
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::InProgress,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: PairOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self, state: RunState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Updated { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Skipped { .. }))
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PairOutcome::Rejected { .. }))
            .count()
    }

    /// Looks up the outcome recorded for `pair`.
    pub fn outcome_for(&self, pair: &PairId) -> Option<&PairOutcome> {
        self.outcomes.iter().find(|o| o.pair() == pair)
    }
}
