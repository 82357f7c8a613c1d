//! Assembles the cached data source from command-line settings.

use super::cache_manager;
use std::path::PathBuf;
use stockdoc::data::{
    CachePolicy, CachedDataSource, DataError, FirebaseStore, MemoryCache, StoreConfig,
    YahooQuoteProvider,
};
use tracing::{debug, warn};

/// The source every command reads from.
pub(crate) type Source = CachedDataSource<FirebaseStore, YahooQuoteProvider>;

/// Where cached payloads are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CacheMode {
    /// Always fetch
    Disabled,
    /// Process-local cache, gone on exit
    Memory,
    /// SQLite database at the given path
    Disk(PathBuf),
}

impl CacheMode {
    /// Resolve the mode from the global flags. `--no-cache` wins.
    pub(crate) fn from_flags(no_cache: bool, memory_cache: bool, path: Option<PathBuf>) -> Self {
        if no_cache {
            Self::Disabled
        } else if memory_cache {
            Self::Memory
        } else {
            Self::Disk(path.unwrap_or_else(cache_manager::default_cache_path))
        }
    }
}

/// Settings for [`build_source`].
#[derive(Debug, Clone)]
pub(crate) struct SourceConfig {
    /// Document store connection
    pub store: StoreConfig,
    /// Cache backend
    pub cache: CacheMode,
    /// Entry lifetimes
    pub policy: CachePolicy,
    /// Skip cache reads, still write fresh payloads
    pub force_refresh: bool,
}

/// Connect to the store and the price service behind the configured cache.
///
/// A disk cache that cannot be opened degrades to a process-local one.
pub(crate) fn build_source(config: SourceConfig) -> Result<Source, DataError> {
    let store = FirebaseStore::new(config.store)?;
    let prices = YahooQuoteProvider::new()?;
    let source = CachedDataSource::new(store, prices)
        .with_policy(config.policy)
        .with_force_refresh(config.force_refresh);

    Ok(match config.cache {
        CacheMode::Disabled => {
            debug!("cache disabled");
            source
        }
        CacheMode::Memory => source.with_cache(MemoryCache::new()),
        CacheMode::Disk(path) => match cache_manager::open_cache(&path) {
            Ok(cache) => {
                debug!(path = %path.display(), "using disk cache");
                source.with_cache(cache)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "disk cache unavailable, using memory cache");
                source.with_cache(MemoryCache::new())
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true, CacheMode::Disabled)]
    #[case(true, false, CacheMode::Disabled)]
    #[case(false, true, CacheMode::Memory)]
    fn test_cache_mode_flags(#[case] no_cache: bool, #[case] memory: bool, #[case] expected: CacheMode) {
        assert_eq!(CacheMode::from_flags(no_cache, memory, None), expected);
    }

    #[test]
    fn test_disk_cache_is_default() {
        let mode = CacheMode::from_flags(false, false, None);
        assert_eq!(mode, CacheMode::Disk(cache_manager::default_cache_path()));

        let custom = PathBuf::from("/tmp/custom.db");
        assert_eq!(
            CacheMode::from_flags(false, false, Some(custom.clone())),
            CacheMode::Disk(custom)
        );
    }
}
