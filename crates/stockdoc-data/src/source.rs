//! Read-through data source combining the store, the price service and a cache.

use crate::cache::{CacheKey, CachePolicy, CacheStore, CacheTier};
use crate::error::{DataError, Result};
use crate::normalize::{RecordNormalizer, raw_table_from_value};
use crate::prices::PriceSource;
use crate::records::{
    DividendSeries, Granularity, PeriodSeries, PriceSeries, TickerFundamentals, ValuationSnapshot,
};
use crate::store::FundamentalsStore;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

/// Fetches normalized data for a ticker, reading through an optional cache.
pub struct CachedDataSource<S, P> {
    store: S,
    prices: P,
    cache: Option<Box<dyn CacheStore>>,
    policy: CachePolicy,
    normalizer: RecordNormalizer,
    force_refresh: bool,
}

impl<S, P> std::fmt::Debug for CachedDataSource<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedDataSource")
            .field("cached", &self.cache.is_some())
            .field("policy", &self.policy)
            .field("force_refresh", &self.force_refresh)
            .finish_non_exhaustive()
    }
}

impl<S, P> CachedDataSource<S, P>
where
    S: FundamentalsStore + Sync,
    P: PriceSource + Sync,
{
    /// Uncached source over `store` and `prices`.
    pub fn new(store: S, prices: P) -> Self {
        Self {
            store,
            prices,
            cache: None,
            policy: CachePolicy::default(),
            normalizer: RecordNormalizer::default(),
            force_refresh: false,
        }
    }

    /// Builder: read through `cache`.
    pub fn with_cache(mut self, cache: impl CacheStore + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// Builder: override the per-tier lifetimes.
    pub const fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: override the record normalizer.
    pub const fn with_normalizer(mut self, normalizer: RecordNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Builder: skip cache reads, still writing fresh results back.
    pub const fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Underlying price source.
    pub const fn prices(&self) -> &P {
        &self.prices
    }

    /// All tickers in the store, sorted.
    pub async fn ticker_list(&self) -> Result<Vec<String>> {
        self.cached(CacheKey::ticker_list(), async {
            let mut tickers = self.store.ticker_list().await?;
            tickers.sort();
            Ok(tickers)
        })
        .await
    }

    /// Annual and quarterly periods plus the valuation snapshot for `ticker`.
    ///
    /// Fails with [`DataError::DataUnavailable`] when either collection is
    /// missing from the store.
    pub async fn get_data(&self, ticker: &str) -> Result<TickerFundamentals> {
        let annual = self.periods(ticker, Granularity::Annual).await?;
        let quarterly = self.periods(ticker, Granularity::Quarterly).await?;
        let snapshot = self.snapshot(ticker).await?;

        info!(
            ticker,
            annual = annual.len(),
            quarterly = quarterly.len(),
            "loaded fundamentals"
        );

        Ok(TickerFundamentals {
            ticker: ticker.to_string(),
            annual,
            quarterly,
            snapshot,
        })
    }

    /// Normalized period series for one granularity.
    pub async fn periods(&self, ticker: &str, granularity: Granularity) -> Result<PeriodSeries> {
        let tier = match granularity {
            Granularity::Annual => CacheTier::Annual,
            Granularity::Quarterly => CacheTier::Quarterly,
        };
        self.cached(CacheKey::new(ticker, tier), async {
            let raw = self.store.raw_periods(ticker, granularity).await?;
            let table = raw_table_from_value(ticker, raw)?;
            self.normalizer.normalize_periods(ticker, granularity, &table)
        })
        .await
    }

    /// Dividend history of `ticker`; empty when the company pays none.
    pub async fn get_dividends(&self, ticker: &str) -> Result<DividendSeries> {
        self.cached(CacheKey::new(ticker, CacheTier::Dividends), async {
            let raw = self.store.raw_dividends(ticker).await?;
            if raw.is_null() {
                debug!(ticker, "no dividend node, treating as non-payer");
                return Ok(DividendSeries::empty(ticker));
            }
            let table = raw_table_from_value(ticker, raw)?;
            self.normalizer.normalize_dividends(ticker, &table)
        })
        .await
    }

    /// Daily adjusted-close history of `ticker`.
    pub async fn get_prices(&self, ticker: &str) -> Result<PriceSeries> {
        self.cached(
            CacheKey::new(ticker, CacheTier::Prices),
            self.prices.historical_prices(ticker),
        )
        .await
    }

    /// Current price of `ticker`. Never cached.
    pub async fn live_price(&self, ticker: &str) -> Result<f64> {
        self.prices.live_price(ticker).await
    }

    async fn snapshot(&self, ticker: &str) -> Result<ValuationSnapshot> {
        self.cached(CacheKey::new(ticker, CacheTier::Snapshot), async {
            let raw = self.store.valuation_snapshot(ticker).await?;
            Ok(parse_snapshot(ticker, raw))
        })
        .await
    }

    /// Serve `key` from the cache when fresh, otherwise await `fetch` and store its result.
    ///
    /// Cache failures are logged and never fail the read.
    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        let now = Utc::now();

        if let Some(cache) = self.cache.as_deref().filter(|_| !self.force_refresh) {
            match cache.get(&key, self.policy.fresh_since(key.tier, now)) {
                Ok(Some(payload)) => match serde_json::from_str(&payload) {
                    Ok(value) => {
                        debug!(%key, "cache hit");
                        return Ok(value);
                    }
                    Err(e) => warn!(%key, error = %e, "discarding unreadable cache entry"),
                },
                Ok(None) => debug!(%key, "cache miss"),
                Err(e) => warn!(%key, error = %e, "cache read failed"),
            }
        }

        let value = fetch.await?;

        if let Some(cache) = self.cache.as_deref() {
            let stored = serde_json::to_string(&value)
                .map_err(DataError::from)
                .and_then(|payload| cache.put(&key, &payload, now));
            if let Err(e) = stored {
                warn!(%key, error = %e, "cache write failed");
            }
        }

        Ok(value)
    }
}

/// Vendor snapshot; absent or malformed nodes yield an empty snapshot.
fn parse_snapshot(ticker: &str, raw: Value) -> ValuationSnapshot {
    if raw.is_null() {
        return ValuationSnapshot::default();
    }
    serde_json::from_value(raw).unwrap_or_else(|e| {
        warn!(ticker, error = %e, "ignoring malformed valuation snapshot");
        ValuationSnapshot::default()
    })
}
