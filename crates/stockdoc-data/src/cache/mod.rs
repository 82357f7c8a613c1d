//! Time-bounded caching of fetched payloads.
//!
//! Entries are keyed by `(ticker, tier)` and hold the serialized form of the
//! fetched value. Freshness is decided by the reader, who passes the oldest
//! acceptable `cached_at` timestamp.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::{CacheStats, SqliteCache};

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker used for entries that do not belong to a single ticker.
pub const CATALOG_TICKER: &str = "*";

/// Kind of payload held by a cache entry. Each tier has its own lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheTier {
    /// Sorted list of all tickers in the store
    TickerList,
    /// Annual period collection
    Annual,
    /// Quarterly period collection
    Quarterly,
    /// Dividend history
    Dividends,
    /// Daily price history
    Prices,
    /// Vendor valuation snapshot
    Snapshot,
}

impl CacheTier {
    /// Every tier.
    pub const ALL: &'static [Self] = &[
        Self::TickerList,
        Self::Annual,
        Self::Quarterly,
        Self::Dividends,
        Self::Prices,
        Self::Snapshot,
    ];

    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::TickerList => "tickers",
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
            Self::Dividends => "dividends",
            Self::Prices => "prices",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Identity of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Ticker in store form, or [`CATALOG_TICKER`]
    pub ticker: String,
    /// Payload kind
    pub tier: CacheTier,
}

impl CacheKey {
    /// Key for a per-ticker payload.
    pub fn new(ticker: impl Into<String>, tier: CacheTier) -> Self {
        Self {
            ticker: ticker.into(),
            tier,
        }
    }

    /// Key for the ticker catalog.
    pub fn ticker_list() -> Self {
        Self::new(CATALOG_TICKER, CacheTier::TickerList)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tier, self.ticker)
    }
}

/// Lifetime of entries per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Ticker catalog lifetime (default: 24h)
    pub ticker_list: Duration,
    /// Fundamentals lifetime, covering period collections and snapshots (default: 24h)
    pub fundamentals: Duration,
    /// Dividend history lifetime (default: 24h)
    pub dividends: Duration,
    /// Price history lifetime (default: 8h)
    pub prices: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ticker_list: Duration::hours(24),
            fundamentals: Duration::hours(24),
            dividends: Duration::hours(24),
            prices: Duration::hours(8),
        }
    }
}

impl CachePolicy {
    /// Lifetime of entries in `tier`.
    pub const fn ttl(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::TickerList => self.ticker_list,
            CacheTier::Annual | CacheTier::Quarterly | CacheTier::Snapshot => self.fundamentals,
            CacheTier::Dividends => self.dividends,
            CacheTier::Prices => self.prices,
        }
    }

    /// Oldest `cached_at` still considered fresh at `now`.
    pub fn fresh_since(&self, tier: CacheTier, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.ttl(tier)
    }
}

/// Storage backend for cached payloads.
///
/// Implementations must be safe to share between tasks; SQLite connections are
/// serialized behind a mutex.
pub trait CacheStore: Send + Sync {
    /// Payload stored under `key` if it was cached at or after `fresh_since`.
    fn get(&self, key: &CacheKey, fresh_since: DateTime<Utc>) -> Result<Option<String>>;

    /// Store `payload` under `key`, replacing any previous entry.
    fn put(&self, key: &CacheKey, payload: &str, cached_at: DateTime<Utc>) -> Result<()>;

    /// Drop every entry of `ticker`.
    fn invalidate(&self, ticker: &str) -> Result<()>;

    /// Drop all entries.
    fn clear(&self) -> Result<()>;
}
