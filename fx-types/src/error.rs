//! Error types for the exchange rate refresh service.

use crate::ports::RateError;

/// Domain-level errors (invalid identifiers and values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Invalid currency pair: {0:?} (expected SRC->TGT)")]
    InvalidPairId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Batch-fatal failures of a refresh run.
///
/// Per-pair conditions (no rate available, non-positive rate) never surface
/// here; they are recorded as outcomes in the run report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("A refresh run is already in progress")]
    AlreadyRunning,

    #[error("Failed to load refresh input: {0}")]
    Load(#[source] RepoError),

    #[error("Refresh run rolled back: {0}")]
    RolledBack(#[source] RepoError),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
            RepoError::InvalidData(e) => AppError::Internal(e),
        }
    }
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::AlreadyRunning => AppError::Conflict(err.to_string()),
            RunError::Load(_) | RunError::RolledBack(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::NoRateAvailable { .. } => AppError::NotFound(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CurrencyCode;

    #[test]
    fn test_run_error_mapping() {
        assert!(matches!(
            AppError::from(RunError::AlreadyRunning),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RunError::RolledBack(RepoError::Database("boom".into()))),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_no_rate_maps_to_not_found() {
        let err = RateError::NoRateAvailable {
            base: CurrencyCode::new("USD"),
            request: CurrencyCode::new("XXX"),
        };
        assert!(matches!(AppError::from(err), AppError::NotFound(_)));
    }
}
