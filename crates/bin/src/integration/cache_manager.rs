//! Cache manager for store payloads and price histories.
//!
//! The SQLite cache lives in a platform-specific default location.

use std::path::{Path, PathBuf};
use stockdoc::data::{DataError, SqliteCache};

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/stockdoc/`
/// - macOS: `~/Library/Caches/stockdoc/`
/// - Windows: `%LOCALAPPDATA%\stockdoc\cache\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockdoc")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("stockdoc.db")
}

/// Open the cache at `path`, creating the directory if needed.
pub(crate) fn open_cache(path: &Path) -> Result<SqliteCache, DataError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteCache::new(path)
}

/// Print location and size of the cache at `path`.
pub(crate) fn print_cache_info(path: &Path) {
    println!("  Cache location: {}", path.display());
    match open_cache(path).and_then(|cache| cache.get_stats()) {
        Ok(stats) => println!(
            "  Cached data: {} payloads for {} tickers ({} price histories, {} bytes)",
            stats.entries, stats.unique_tickers, stats.price_histories, stats.payload_bytes
        ),
        Err(e) => println!("  Cache unreadable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_is_named_after_the_tool() {
        let path = default_cache_path();
        assert!(path.ends_with("stockdoc/stockdoc.db"));
    }

    #[test]
    fn test_open_cache_creates_directory() {
        let dir = std::env::temp_dir().join("stockdoc_cache_manager_test");
        let path = dir.join("nested").join("cache.db");
        let cache = open_cache(&path).unwrap();
        assert_eq!(cache.get_stats().unwrap().entries, 0);
        std::fs::remove_dir_all(dir).ok();
    }
}
