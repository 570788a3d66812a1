//! PostgreSQL repository adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use fx_types::{
    CurrencyPair, ExchangeRateRepository, PairId, RateUpdateTx, RepoError, SyncLogEntry,
};

use crate::types::parse_pair_id;
use crate::types::postgres::{DbCurrencyPair, DbOffset, DbSyncLogEntry};

const SCHEMA: &str = include_str!("../migrations/postgres/0001_create_tables.sql");

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration 0001 failed: {}", e))?;
        tracing::info!("PostgreSQL schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate update transaction
// ─────────────────────────────────────────────────────────────────────────────

/// Open PostgreSQL transaction for one refresh run.
pub struct PostgresRateUpdate {
    tx: Transaction<'static, Postgres>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl RateUpdateTx for PostgresRateUpdate {
    async fn stage_rate_update(&mut self, pair: &PairId, rate: Decimal) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE currency_pairs SET middle_rate = $1, updated_at = $2
               WHERE source_currency = $3 AND target_currency = $4"#,
        )
        .bind(rate)
        .bind(self.updated_at)
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
impl ExchangeRateRepository for PostgresRepo {
    async fn list_active_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError> {
        let rows: Vec<DbCurrencyPair> = sqlx::query_as(
            r#"SELECT source_currency, target_currency, is_active, middle_rate, updated_at
               FROM currency_pairs WHERE is_active
               ORDER BY source_currency, target_currency"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DbCurrencyPair::into_domain).collect())
    }

    async fn list_pairs(&self) -> Result<Vec<CurrencyPair>, RepoError> {
        let rows: Vec<DbCurrencyPair> = sqlx::query_as(
            r#"SELECT source_currency, target_currency, is_active, middle_rate, updated_at
               FROM currency_pairs ORDER BY source_currency, target_currency"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DbCurrencyPair::into_domain).collect())
    }

    async fn upsert_pair(
        &self,
        pair: &PairId,
        is_active: bool,
    ) -> Result<CurrencyPair, RepoError> {
        let row: DbCurrencyPair = sqlx::query_as(
            r#"INSERT INTO currency_pairs (source_currency, target_currency, is_active)
               VALUES ($1, $2, $3)
               ON CONFLICT (source_currency, target_currency)
               DO UPDATE SET is_active = EXCLUDED.is_active
               RETURNING source_currency, target_currency, is_active, middle_rate, updated_at"#,
        )
        .bind(pair.source().as_str())
        .bind(pair.target().as_str())
        .bind(is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.into_domain())
    }

    async fn load_offsets(&self) -> Result<HashMap<PairId, Decimal>, RepoError> {
        let rows: Vec<DbOffset> = sqlx::query_as(r#"SELECT pair_id, value FROM pair_offsets"#)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| Ok((parse_pair_id(&row.pair_id)?, row.value)))
            .collect()
    }

    async fn get_offset(&self, pair: &PairId) -> Result<Decimal, RepoError> {
        let row: Option<DbOffset> =
            sqlx::query_as(r#"SELECT pair_id, value FROM pair_offsets WHERE pair_id = $1"#)
                .bind(pair.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(|row| row.value).unwrap_or(Decimal::ZERO))
    }

    async fn set_offset(&self, pair: &PairId, offset: Decimal) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO pair_offsets (pair_id, value) VALUES ($1, $2)
               ON CONFLICT (pair_id) DO UPDATE SET value = EXCLUDED.value"#,
        )
        .bind(pair.to_string())
        .bind(offset)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }

    async fn save_default_offset(&self, pair: &PairId) -> Result<Decimal, RepoError> {
        sqlx::query(
            r#"INSERT INTO pair_offsets (pair_id, value) VALUES ($1, $2)
               ON CONFLICT (pair_id) DO NOTHING"#,
        )
        .bind(pair.to_string())
        .bind(Decimal::ZERO)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        self.get_offset(pair).await
    }

    async fn log_sync_warning(&self, message: &str) -> Result<SyncLogEntry, RepoError> {
        let entry = SyncLogEntry::warning(message);

        sqlx::query(
            r#"INSERT INTO sync_log (id, level, message, created_at) VALUES ($1, $2, $3, $4)"#,
        )
        .bind(entry.id)
        .bind(entry.level.to_string())
        .bind(&entry.message)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(entry)
    }

    async fn list_sync_log(&self, limit: i64) -> Result<Vec<SyncLogEntry>, RepoError> {
        let rows: Vec<DbSyncLogEntry> = sqlx::query_as(
            r#"SELECT id, level, message, created_at FROM sync_log
               ORDER BY created_at DESC LIMIT $1"#,
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

        Ok(Box::new(PostgresRateUpdate {
            tx,
            updated_at: Utc::now(),
        }))
    }
}
