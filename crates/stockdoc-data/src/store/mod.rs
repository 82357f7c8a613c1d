//! Remote document store access.

pub mod firebase;
pub mod memory;

pub use firebase::{FirebaseStore, StoreConfig};
pub use memory::MemoryStore;

use crate::error::{DataError, Result};
use crate::records::Granularity;
use serde_json::Value;
use std::future::Future;

/// Read-only view of the fundamentals document store.
///
/// Methods return raw payloads; normalization happens in
/// [`crate::normalize::RecordNormalizer`].
pub trait FundamentalsStore {
    /// All ticker symbols known to the store.
    fn ticker_list(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Raw period collection for `ticker`.
    fn raw_periods(
        &self,
        ticker: &str,
        granularity: Granularity,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Raw dividend collection for `ticker`.
    fn raw_dividends(&self, ticker: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Raw valuation snapshot for `ticker`; `Value::Null` when none is stored.
    fn valuation_snapshot(&self, ticker: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Characters that cannot appear in a store key.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']', '/'];

/// Validate a ticker before using it as a store path segment.
pub fn validate_ticker(ticker: &str) -> Result<()> {
    if ticker.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    if ticker.contains(FORBIDDEN_KEY_CHARS) {
        return Err(DataError::InvalidSymbol(ticker.to_string()));
    }
    Ok(())
}

/// Parse the `allnames/list` payload into a sorted ticker list.
pub(crate) fn parse_ticker_list(payload: Value) -> Result<Vec<String>> {
    let names = payload
        .get("names")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::unavailable("*", "ticker catalog missing from store"))?;

    let mut tickers: Vec<String> = names
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    tickers.sort();
    tickers.dedup();
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_ticker() {
        assert!(validate_ticker("BRK_B").is_ok());
        assert!(matches!(validate_ticker(""), Err(DataError::InvalidSymbol(_))));
        assert!(matches!(validate_ticker("A/B"), Err(DataError::InvalidSymbol(_))));
    }

    #[test]
    fn test_parse_ticker_list_sorted() {
        let tickers = parse_ticker_list(json!({"names": ["MSFT", "AAPL", "", "AAPL"]})).unwrap();
        assert_eq!(tickers, vec!["AAPL".to_string(), "MSFT".to_string()]);

        assert!(parse_ticker_list(Value::Null).unwrap_err().is_unavailable());
    }
}
