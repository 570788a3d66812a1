//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use fx_types::{
    CurrencyPair, ExchangeRateRepository, PairId, RateUpdateTx, RepoError, SyncLogEntry,
};

use crate::types::sqlite::{DbCurrencyPair, DbOffset, DbSyncLogEntry, format_timestamp};
use crate::types::{parse_decimal, parse_pair_id};

const SCHEMA: &str = include_str!("../migrations/sqlite/0001_create_tables.sql");

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database opens a separate database,
        // so those are pinned to one long-lived connection.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        tracing::info!("SQLite schema ready");

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_pair(&self, pair: &PairId) -> Result<CurrencyPair, RepoError> {
        let row: Option<DbCurrencyPair> = sqlx::query_as(
            r#"SELECT source_currency, target_currency, is_active, middle_rate, updated_at
               FROM currency_pairs WHERE source_currency = ? AND target_currency = ?"#,
        )
        .bind(pair.source().as_str())
        .bind(pair.target().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.ok_or(RepoError::NotFound)?.into_domain()
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate update transaction
// ─────────────────────────────────────────────────────────────────────────────

/// Open SQLite transaction for one refresh run.
pub struct SqliteRateUpdate {
    tx: Transaction<'static, Sqlite>,
    updated_at: String,
}

#[async_trait]
impl RateUpdateTx for SqliteRateUpdate {
    async fn stage_rate_update(&mut self, pair: &PairId, rate: Decimal) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE currency_pairs SET middle_rate = ?, updated_at = ?
               WHERE source_currency = ? AND target_currency = ?"#,
        )
        .bind(rate.to_string())
        .bind(&self.updated_at)
        .bind(pair.source().as_str())
        .bind(pair.target().as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepoError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ExchangeRateRepository for SqliteRepo {
    async fn list_active_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError> {
        let rows: Vec<DbCurrencyPair> = sqlx::query_as(
            r#"SELECT source_currency, target_currency, is_active, middle_rate, updated_at
               FROM currency_pairs WHERE is_active = 1
               ORDER BY source_currency, target_currency"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrencyPair::into_domain).collect()
    }

    async fn list_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError> {
        let rows: Vec<DbCurrencyPair> = sqlx::query_as(
            r#"SELECT source_currency, target_currency, is_active, middle_rate, updated_at
               FROM currency_pairs ORDER BY source_currency, target_currency"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbCurrencyPair::into_domain).collect()
    }

    async fn upsert_pair(
        &self,
        pair: &PairId,
        is_active: bool,
    ) -> Result<CurrencyPair, RepoError> {
        sqlx::query(
            r#"INSERT INTO currency_pairs (source_currency, target_currency, is_active) VALUES (?, ?, ?)
               ON CONFLICT (source_currency, target_currency) DO UPDATE SET is_active = excluded.is_active"#,
        )
        .bind(pair.source().as_str())
        .bind(pair.target().as_str())
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        self.fetch_pair(pair).await
    }

    async fn load_offsets(&self) -> Result<HashMap<PairId, Decimal>, RepoError> {
        let rows: Vec<DbOffset> = sqlx::query_as(r#"SELECT pair_id, value FROM pair_offsets"#)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| Ok((parse_pair_id(&row.pair_id)?, parse_decimal(&row.value)?)))
            .collect()
    }

    async fn get_offset(&self, pair: &PairId) -> Result<Decimal, RepoError> {
        let row: Option<DbOffset> =
            sqlx::query_as(r#"SELECT pair_id, value FROM pair_offsets WHERE pair_id = ?"#)
                .bind(pair.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            Some(row) => parse_decimal(&row.value),
            None => Ok(Decimal::ZERO),
        }
    }

    async fn set_offset(&self, pair: &PairId, offset: Decimal) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO pair_offsets (pair_id, value) VALUES (?, ?)
               ON CONFLICT (pair_id) DO UPDATE SET value = excluded.value"#,
        )
        .bind(pair.to_string())
        .bind(offset.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn save_default_offset(&self, pair: &PairId) -> Result<Decimal, RepoError> {
        sqlx::query(
            r#"INSERT INTO pair_offsets (pair_id, value) VALUES (?, ?)
               ON CONFLICT (pair_id) DO NOTHING"#,
        )
        .bind(pair.to_string())
        .bind(Decimal::ZERO.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        self.get_offset(pair).await
    }

    async fn log_sync_warning(&self, message: &str) -> Result<SyncLogEntry, RepoError> {
        let entry = SyncLogEntry::warning(message);

        sqlx::query(
            r#"INSERT INTO sync_log (id, level, message, created_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(entry.level.to_string())
        .bind(&entry.message)
        .bind(format_timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(entry)
    }

    async fn list_sync_log(&self, limit: i64) -> Result<Vec<SyncLogEntry>, RepoError> {
        let rows: Vec<DbSyncLogEntry> = sqlx::query_as(
            r#"SELECT id, level, message, created_at FROM sync_log
               ORDER BY created_at DESC, rowid DESC LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbSyncLogEntry::into_domain).collect()
    }

    async fn begin_rate_update(&self) -> Result<Box<dyn RateUpdateTx>, RepoError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(Box::new(SqliteRateUpdate {
            tx,
            updated_at: format_timestamp(chrono::Utc::now()),
        }))
    }
}
