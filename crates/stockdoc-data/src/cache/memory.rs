//! Process-local cache.

use super::{CacheKey, CacheStore};
use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    cached_at: DateTime<Utc>,
}

/// In-memory cache living as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CacheKey, Entry>>> {
        self.entries
            .lock()
            .map_err(|e| DataError::Cache(format!("memory cache poisoned: {}", e)))
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey, fresh_since: DateTime<Utc>) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .get(key)
            .filter(|entry| entry.cached_at >= fresh_since)
            .map(|entry| entry.payload.clone()))
    }

    fn put(&self, key: &CacheKey, payload: &str, cached_at: DateTime<Utc>) -> Result<()> {
        self.lock()?.insert(
            key.clone(),
            Entry {
                payload: payload.to_string(),
                cached_at,
            },
        );
        Ok(())
    }

    fn invalidate(&self, ticker: &str) -> Result<()> {
        self.lock()?.retain(|key, _| key.ticker != ticker);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheTier;
    use chrono::Duration;

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        let key = CacheKey::new("AAPL", CacheTier::Prices);
        let now = Utc::now();

        cache.put(&key, "[1,2,3]", now - Duration::hours(9)).unwrap();
        assert_eq!(cache.get(&key, now - Duration::hours(8)).unwrap(), None);

        cache.put(&key, "[4]", now).unwrap();
        assert_eq!(
            cache.get(&key, now - Duration::hours(8)).unwrap().as_deref(),
            Some("[4]")
        );
    }

    #[test]
    fn test_invalidate_ticker() {
        let cache = MemoryCache::new();
        let now = Utc::now();
        cache.put(&CacheKey::new("AAPL", CacheTier::Annual), "a", now).unwrap();
        cache.put(&CacheKey::new("AAPL", CacheTier::Quarterly), "q", now).unwrap();
        cache.put(&CacheKey::new("MSFT", CacheTier::Annual), "m", now).unwrap();

        cache.invalidate("AAPL").unwrap();
        assert_eq!(cache.len().unwrap(), 1);

        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }
}
