//! SQLite caching layer for fetched payloads.

use super::{CacheKey, CachePolicy, CacheStore, CacheTier};
use crate::error::{DataError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// SQLite cache persisting payloads between runs.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DataError::Cache(format!("sqlite connection poisoned: {}", e)))
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS payloads (
                ticker TEXT NOT NULL,
                tier TEXT NOT NULL,
                payload TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (ticker, tier)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_payloads_cached_at ON payloads(cached_at)",
            [],
        )?;

        Ok(())
    }

    /// Delete every entry older than its tier's lifetime.
    ///
    /// Returns the number of rows removed.
    pub fn purge_expired(&self, policy: &CachePolicy, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock()?;
        let mut removed = 0;
        for tier in CacheTier::ALL {
            removed += conn.execute(
                "DELETE FROM payloads WHERE tier = ?1 AND cached_at < ?2",
                params![tier.to_db_str(), timestamp(policy.fresh_since(*tier, now))],
            )?;
        }
        debug!(removed, "purged expired cache entries");
        Ok(removed)
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;

        let entries: i64 = conn.query_row("SELECT COUNT(*) FROM payloads", [], |row| row.get(0))?;

        let tickers: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT ticker) FROM payloads WHERE ticker != ?1",
            params![super::CATALOG_TICKER],
            |row| row.get(0),
        )?;

        let price_histories: i64 = conn.query_row(
            "SELECT COUNT(*) FROM payloads WHERE tier = ?1",
            params![CacheTier::Prices.to_db_str()],
            |row| row.get(0),
        )?;

        let bytes: i64 = conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(payload)), 0) FROM payloads",
            [],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            entries: entries as usize,
            unique_tickers: tickers as usize,
            price_histories: price_histories as usize,
            payload_bytes: bytes as usize,
        })
    }
}

/// Fixed-width RFC 3339 so timestamps order correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl CacheStore for SqliteCache {
    fn get(&self, key: &CacheKey, fresh_since: DateTime<Utc>) -> Result<Option<String>> {
        let conn = self.lock()?;
        let payload = conn
            .query_row(
                "SELECT payload FROM payloads
                 WHERE ticker = ?1 AND tier = ?2 AND cached_at >= ?3",
                params![key.ticker, key.tier.to_db_str(), timestamp(fresh_since)],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn put(&self, key: &CacheKey, payload: &str, cached_at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO payloads (ticker, tier, payload, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key.ticker, key.tier.to_db_str(), payload, timestamp(cached_at)],
        )?;
        Ok(())
    }

    fn invalidate(&self, ticker: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM payloads WHERE ticker = ?1", params![ticker])?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM payloads", [])?;
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cached payloads
    pub entries: usize,
    /// Number of distinct tickers with at least one payload
    pub unique_tickers: usize,
    /// Number of cached price histories
    pub price_histories: usize,
    /// Total payload size in bytes
    pub payload_bytes: usize,
}
