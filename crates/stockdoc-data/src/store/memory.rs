//! In-process store holding JSON documents by path.

use super::{FundamentalsStore, parse_ticker_list, validate_ticker};
use crate::error::Result;
use crate::records::Granularity;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store serving documents from memory with the same path layout and
/// null-for-missing semantics as the remote database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: HashMap<String, Value>,
    reads: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: place `value` at `path`.
    pub fn with_node(mut self, path: impl Into<String>, value: Value) -> Self {
        self.nodes.insert(path.into(), value);
        self
    }

    /// Builder: set the ticker catalog.
    pub fn with_tickers<I, S>(self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = tickers.into_iter().map(Into::into).collect();
        self.with_node("allnames/list", json!({ "names": names }))
    }

    /// Builder: register the annual and quarterly collections of a ticker.
    pub fn with_fundamentals(self, ticker: &str, annual: Value, quarterly: Value) -> Self {
        self.with_node(format!("year/{}", ticker), annual)
            .with_node(format!("quarter/{}", ticker), quarterly)
    }

    /// Builder: register the dividend collection of a ticker.
    pub fn with_dividends(self, ticker: &str, dividends: Value) -> Self {
        self.with_node(format!("dividends/{}", ticker), dividends)
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn get_node(&self, path: &str) -> Value {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.nodes.get(path).cloned().unwrap_or(Value::Null)
    }
}

impl FundamentalsStore for MemoryStore {
    async fn ticker_list(&self) -> Result<Vec<String>> {
        parse_ticker_list(self.get_node("allnames/list"))
    }

    async fn raw_periods(&self, ticker: &str, granularity: Granularity) -> Result<Value> {
        validate_ticker(ticker)?;
        Ok(self.get_node(&format!("{}/{}", granularity.store_node(), ticker)))
    }

    async fn raw_dividends(&self, ticker: &str) -> Result<Value> {
        validate_ticker(ticker)?;
        Ok(self.get_node(&format!("dividends/{}", ticker)))
    }

    async fn valuation_snapshot(&self, ticker: &str) -> Result<Value> {
        validate_ticker(ticker)?;
        Ok(self.get_node(&format!("stats/{}", ticker)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_node_is_null() {
        let store = MemoryStore::new().with_tickers(["AAPL"]);
        let value = store.raw_periods("MSFT", Granularity::Annual).await.unwrap();
        assert!(value.is_null());
        assert_eq!(store.ticker_list().await.unwrap(), vec!["AAPL".to_string()]);
        assert_eq!(store.reads(), 2);
    }
}
