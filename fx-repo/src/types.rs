//! Database row structs, one set per backend.

use std::str::FromStr;

use rust_decimal::Decimal;

use fx_types::{PairId, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Shared parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn parse_pair_id(raw: &str) -> Result<PairId, RepoError> {
    PairId::from_str(raw).map_err(|e| RepoError::InvalidData(e.to_string()))
}

#[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| RepoError::InvalidData(format!("invalid decimal {:?}: {}", raw, e)))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows (decimals and timestamps stored as TEXT)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub(crate) mod sqlite {
    use chrono::{DateTime, SecondsFormat, Utc};
    use sqlx::FromRow;
    use uuid::Uuid;

    use fx_types::{CurrencyPair, PairId, RepoError, SyncLogEntry};

    use super::parse_decimal;

    /// Timestamps are written with fixed precision so TEXT ordering matches time ordering.
    pub fn format_timestamp(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepoError::InvalidData(format!("invalid timestamp {:?}: {}", raw, e)))
    }

    /// Currency pair row from database.
    #[derive(FromRow)]
    pub struct DbCurrencyPair {
        pub source_currency: String,
        pub target_currency: String,
        pub is_active: bool,
        pub middle_rate: Option<String>,
        pub updated_at: Option<String>,
    }

    impl DbCurrencyPair {
        pub fn into_domain(self) -> Result<CurrencyPair, RepoError> {
            Ok(CurrencyPair {
                id: PairId::new(self.source_currency, self.target_currency),
                is_active: self.is_active,
                middle_rate: self.middle_rate.as_deref().map(parse_decimal).transpose()?,
                updated_at: self.updated_at.as_deref().map(parse_timestamp).transpose()?,
            })
        }
    }

    /// Offset row from database.
    #[derive(FromRow)]
    pub struct DbOffset {
        pub pair_id: String,
        pub value: String,
    }

    /// Sync log row from database.
    #[derive(FromRow)]
    pub struct DbSyncLogEntry {
        pub id: String,
        pub level: String,
        pub message: String,
        pub created_at: String,
    }

    impl DbSyncLogEntry {
        pub fn into_domain(self) -> Result<SyncLogEntry, RepoError> {
            Ok(SyncLogEntry {
                id: Uuid::parse_str(&self.id).map_err(|e| RepoError::InvalidData(e.to_string()))?,
                level: self.level.parse().map_err(RepoError::InvalidData)?,
                message: self.message,
                created_at: parse_timestamp(&self.created_at)?,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows (native NUMERIC, TIMESTAMPTZ and UUID columns)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub(crate) mod postgres {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use sqlx::FromRow;
    use uuid::Uuid;

    use fx_types::{CurrencyPair, PairId, RepoError, SyncLogEntry};

    /// Currency pair row from database.
    #[derive(FromRow)]
    pub struct DbCurrencyPair {
        pub source_currency: String,
        pub target_currency: String,
        pub is_active: bool,
        pub middle_rate: Option<Decimal>,
        pub updated_at: Option<DateTime<Utc>>,
    }

    impl DbCurrencyPair {
        pub fn into_domain(self) -> CurrencyPair {
            CurrencyPair {
                id: PairId::new(self.source_currency, self.target_currency),
                is_active: self.is_active,
                middle_rate: self.middle_rate,
                updated_at: self.updated_at,
            }
        }
    }

    /// Offset row from database.
    #[derive(FromRow)]
    pub struct DbOffset {
        pub pair_id: String,
        pub value: Decimal,
    }

    /// Sync log row from database.
    #[derive(FromRow)]
    pub struct DbSyncLogEntry {
        pub id: Uuid,
        pub level: String,
        pub message: String,
        pub created_at: DateTime<Utc>,
    }

    impl DbSyncLogEntry {
        pub fn into_domain(self) -> Result<SyncLogEntry, RepoError> {
            Ok(SyncLogEntry {
                id: self.id,
                level: self.level.parse().map_err(RepoError::InvalidData)?,
                message: self.message,
                created_at: self.created_at,
            })
        }
    }
}
