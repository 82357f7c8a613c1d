//! Price data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::prices::{PriceSource, vendor_symbol};
use crate::records::PriceSeries;
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
    history_start: NaiveDate,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("history_start", &self.history_start)
            .finish_non_exhaustive()
    }
}

/// Earliest date requested for full price histories.
const DEFAULT_HISTORY_START: (i32, u32, u32) = (1990, 1, 1);

impl YahooQuoteProvider {
    /// Create a provider with default rate limiting (200ms between requests).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(200))
    }

    /// Create a provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        let (y, m, d) = DEFAULT_HISTORY_START;
        let history_start = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DataError::TimeConversion("invalid history start".to_string()))?;
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
            history_start,
        })
    }

    /// Builder: change the first date requested for full histories.
    pub const fn with_history_start(mut self, start: NaiveDate) -> Self {
        self.history_start = start;
        self
    }

    async fn quote_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<yahoo::Quote>> {
        // Validate date range
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        // Validate symbol
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Convert chrono DateTime to time::OffsetDateTime
        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(&vendor_symbol(symbol), start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        if quotes.is_empty() {
            return Err(DataError::unavailable(
                symbol,
                "No data returned from Yahoo Finance",
            ));
        }
        Ok(quotes)
    }

    /// Fetch OHLCV data for a single symbol.
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, open, high, low, close, volume, adjusted_close
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        let quotes = self.quote_history(symbol, start, end).await?;

        let dates: Vec<i64> = quotes.iter().map(|q| q.timestamp as i64).collect();
        let opens: Vec<f64> = quotes.iter().map(|q| q.open).collect();
        let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
        let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let volumes: Vec<u64> = quotes.iter().map(|q| q.volume).collect();
        let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

        let mut df = DataFrame::new(vec![
            Series::new("timestamp".into(), dates).into(),
            Series::new("open".into(), opens).into(),
            Series::new("high".into(), highs).into(),
            Series::new("low".into(), lows).into(),
            Series::new("close".into(), closes).into(),
            Series::new("volume".into(), volumes).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        let symbol_col: Column = Series::new("symbol".into(), vec![symbol; df.height()]).into();
        df.with_column(symbol_col)?;

        // Convert timestamp to date
        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select(&[
                col("symbol"),
                col("date"),
                col("open"),
                col("high"),
                col("low"),
                col("close"),
                col("volume"),
                col("adjusted_close"),
            ])
            .collect()?;

        Ok(df)
    }

    /// Fetch the daily adjusted-close history between `start` and `end`.
    pub async fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let quotes = self.fetch_quotes(symbol, start, end).await?;
        adjusted_close_series(&quotes)
    }
}

/// `num_days_from_ce` of 1970-01-01, day zero of the polars `Date` type.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Adjusted closes of a quote frame as a price series.
///
/// Rows with a missing date or a non-finite close are skipped.
pub fn adjusted_close_series(quotes: &DataFrame) -> Result<PriceSeries> {
    let closes = quotes
        .clone()
        .lazy()
        .select([col("date").cast(DataType::Int32), col("adjusted_close")])
        .filter(col("adjusted_close").is_not_null())
        .sort(["date"], Default::default())
        .collect()?;

    let days = closes.column("date")?.i32()?;
    let prices = closes.column("adjusted_close")?.f64()?;
    let points = days
        .into_iter()
        .zip(prices.into_iter())
        .filter_map(|(day, price)| {
            let date = NaiveDate::from_num_days_from_ce_opt(day?.checked_add(EPOCH_DAYS_FROM_CE)?)?;
            price.filter(|p| p.is_finite()).map(|p| (date, p))
        });
    Ok(PriceSeries::from_points(points))
}

impl PriceSource for YahooQuoteProvider {
    async fn historical_prices(&self, ticker: &str) -> Result<PriceSeries> {
        let start = self
            .history_start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| DataError::TimeConversion("invalid history start".to_string()))?;
        let prices = self.fetch_adjusted_close(ticker, start, Utc::now()).await?;
        debug!(ticker, days = prices.len(), "fetched price history");
        Ok(prices)
    }

    async fn live_price(&self, ticker: &str) -> Result<f64> {
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        let response = self
            .provider
            .get_latest_quotes(&vendor_symbol(ticker), "1d")
            .await?;
        let quote = response.last_quote()?;
        Ok(quote.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use chrono::Duration as ChronoDuration;

    fn quote_frame(dates: &[(i32, u32, u32)], closes: Vec<Option<f64>>) -> DataFrame {
        let days: Vec<i32> = dates
            .iter()
            .map(|&(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d).unwrap().num_days_from_ce() - EPOCH_DAYS_FROM_CE
            })
            .collect();
        DataFrame::new(vec![
            Series::new("symbol".into(), vec!["ACME"; days.len()]).into(),
            Series::new("date".into(), days)
                .cast(&DataType::Date)
                .unwrap()
                .into(),
            Series::new("adjusted_close".into(), closes).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_adjusted_close_from_quote_frame() {
        let quotes = quote_frame(
            &[(2024, 1, 3), (2024, 1, 2), (2024, 1, 4), (2024, 1, 5)],
            vec![Some(11.0), Some(10.0), None, Some(f64::NAN)],
        );
        let prices = adjusted_close_series(&quotes).unwrap();

        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices.iter().collect::<Vec<_>>(), vec![(day(2), 10.0), (day(3), 11.0)]);
        assert_eq!(prices.latest(), Some((day(3), 11.0)));
    }

    #[tokio::test]
    async fn test_invalid_date_range() {
        let provider = YahooQuoteProvider::new().unwrap();
        let start = Utc::now();
        let end = start - ChronoDuration::days(30);

        let result = provider.fetch_adjusted_close("AAPL", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::new().unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider.fetch_quotes("", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));

        let result = provider.live_price("").await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }
}
