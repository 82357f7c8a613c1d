//! Price service abstraction.

use crate::error::{DataError, Result};
use crate::records::PriceSeries;
use std::collections::HashMap;
use std::future::Future;

/// Historical and live price lookups.
pub trait PriceSource {
    /// Daily adjusted-close history for `ticker`.
    fn historical_prices(&self, ticker: &str) -> impl Future<Output = Result<PriceSeries>> + Send;

    /// Current price for `ticker`.
    fn live_price(&self, ticker: &str) -> impl Future<Output = Result<f64>> + Send;
}

/// Translate a store ticker to the price vendor's symbol convention.
///
/// The store keys share classes with an underscore (`BRK_B`); the vendor
/// expects a hyphen (`BRK-B`).
pub fn vendor_symbol(ticker: &str) -> String {
    ticker.replace('_', "-")
}

/// Price source serving fixed series, keyed by store ticker.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    histories: HashMap<String, PriceSeries>,
    live: HashMap<String, f64>,
}

impl StaticPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a price history. The live price defaults to the last close.
    pub fn with_history(mut self, ticker: impl Into<String>, prices: PriceSeries) -> Self {
        let ticker = ticker.into();
        if let Some((_, last)) = prices.latest() {
            self.live.entry(ticker.clone()).or_insert(last);
        }
        self.histories.insert(ticker, prices);
        self
    }

    /// Builder: override the live price.
    pub fn with_live_price(mut self, ticker: impl Into<String>, price: f64) -> Self {
        self.live.insert(ticker.into(), price);
        self
    }
}

impl PriceSource for StaticPriceSource {
    async fn historical_prices(&self, ticker: &str) -> Result<PriceSeries> {
        self.histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::unavailable(ticker, "no price history"))
    }

    async fn live_price(&self, ticker: &str) -> Result<f64> {
        self.live
            .get(ticker)
            .copied()
            .ok_or_else(|| DataError::unavailable(ticker, "no live price"))
    }
}
