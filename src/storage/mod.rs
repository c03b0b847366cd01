//! Database connection management
//!
//! One [`Database`] owns the process-wide `sqlx` pool. Activations clone the
//! pool handle; every query borrows a connection for its own duration.

mod migrations;
pub mod seed;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;

pub use migrations::{applied_migrations, MIGRATIONS};

/// Handle to the relational store
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_pool_size)
            .max_connections(config.max_pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!(
            url = %config.url,
            min = config.min_pool_size,
            max = config.max_pool_size,
            "Database connection pool established"
        );

        Ok(Self { pool })
    }

    /// Open the pool and bring the schema up to date
    pub async fn open(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let db = Self::connect(config).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Apply every pending migration
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        migrations::apply_migrations(&self.pool).await
    }

    /// Load the demo catalog and sample users
    pub async fn seed(&self) -> Result<seed::SeedSummary, seed::SeedError> {
        seed::seed(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

// ============================================================================
// Column codecs
// ============================================================================
//
// Ids are stored as hyphenated UUID text, money as decimal text and
// timestamps as unix milliseconds.

pub(crate) fn decode_err<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}

pub(crate) fn uuid_from_column(raw: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(raw).map_err(decode_err)
}

pub(crate) fn decimal_from_column(raw: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str(raw).map_err(decode_err)
}

#[derive(Debug, thiserror::Error)]
#[error("timestamp out of range: {0}")]
pub(crate) struct TimestampRangeError(i64);

pub(crate) fn timestamp_from_column(millis: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| decode_err(TimestampRangeError(millis)))
}

pub(crate) fn timestamp_to_column(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Parse a caller-supplied id; malformed ids simply match nothing
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id("not-a-uuid"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let stored = timestamp_to_column(now);
        assert_eq!(timestamp_from_column(stored).unwrap(), now);
    }

    #[test]
    fn test_decimal_column() {
        assert_eq!(decimal_from_column("15.99").unwrap(), Decimal::new(1599, 2));
        assert!(decimal_from_column("abc").is_err());
    }
}
