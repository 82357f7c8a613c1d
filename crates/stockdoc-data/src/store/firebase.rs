//! Firebase Realtime Database REST client.

use super::{FundamentalsStore, parse_ticker_list, validate_ticker};
use crate::error::Result;
use crate::records::Granularity;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database root URL, e.g. `https://project-default-rtdb.firebaseio.com`
    pub base_url: String,
    /// Database secret or ID token appended as `auth`
    pub auth_token: Option<String>,
    /// Per-request timeout (default: 30s)
    pub timeout: Duration,
}

impl StoreConfig {
    /// Config for `base_url` with no auth and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder: set the auth token.
    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Fundamentals store backed by the Firebase REST API.
#[derive(Debug)]
pub struct FirebaseStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl FirebaseStore {
    /// Create a client for the configured database.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// URL of the JSON document at `path`.
    fn node_url(&self, path: &str) -> String {
        format!(
            "{}/{}.json",
            self.config.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    /// Fetch the document at `path`. A missing node comes back as `Value::Null`.
    async fn get_node(&self, path: &str) -> Result<Value> {
        let mut request = self.client.get(self.node_url(path));
        if let Some(token) = &self.config.auth_token {
            request = request.query(&[("auth", token.as_str())]);
        }

        debug!(path, "store read");
        let value = request
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }
}

impl FundamentalsStore for FirebaseStore {
    async fn ticker_list(&self) -> Result<Vec<String>> {
        parse_ticker_list(self.get_node("allnames/list").await?)
    }

    async fn raw_periods(&self, ticker: &str, granularity: Granularity) -> Result<Value> {
        validate_ticker(ticker)?;
        self.get_node(&format!("{}/{}", granularity.store_node(), ticker))
            .await
    }

    async fn raw_dividends(&self, ticker: &str) -> Result<Value> {
        validate_ticker(ticker)?;
        self.get_node(&format!("dividends/{}", ticker)).await
    }

    async fn valuation_snapshot(&self, ticker: &str) -> Result<Value> {
        validate_ticker(ticker)?;
        self.get_node(&format!("stats/{}", ticker)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_url() {
        let store = FirebaseStore::new(StoreConfig::new("https://db.example.com/")).unwrap();
        assert_eq!(
            store.node_url("year/AAPL"),
            "https://db.example.com/year/AAPL.json"
        );
        assert_eq!(
            store.node_url("/allnames/list/"),
            "https://db.example.com/allnames/list.json"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("https://db.example.com").with_auth("secret");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
