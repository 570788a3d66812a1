//! Synchronization log entries shown to operators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Severity of a synchronization log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncLogLevel {
    Warning,
}

impl std::fmt::Display for SyncLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncLogLevel::Warning => write!(f, "WARNING"),
        }
    }
}

impl std::str::FromStr for SyncLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WARNING" => Ok(SyncLogLevel::Warning),
            other => Err(format!("Unknown sync log level: {}", other)),
        }
    }
}

/// A user-visible, non-fatal anomaly recorded during a refresh run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncLogEntry {
    pub id: Uuid,
    pub level: SyncLogLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl SyncLogEntry {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: SyncLogLevel::Warning,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
