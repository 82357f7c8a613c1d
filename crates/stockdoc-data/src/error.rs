//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Requested ticker (or one of its collections) is not in the store
    #[error("Data unavailable for {ticker}: {reason}")]
    DataUnavailable {
        /// Ticker that was queried
        ticker: String,
        /// Reason the data could not be produced
        reason: String,
    },

    /// Field name outside the fixed statement schema (strict normalization only)
    #[error("Unknown field '{field}' in record {index} for {ticker}")]
    UnknownField {
        /// Ticker being normalized
        ticker: String,
        /// Ordinal index of the offending record
        index: usize,
        /// Field name as delivered by the store
        field: String,
    },

    /// Yahoo Finance API error
    #[error("Yahoo Finance API error: {0}")]
    YahooApi(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Time conversion error
    #[error("Time conversion error: {0}")]
    TimeConversion(String),

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Build a [`DataError::DataUnavailable`].
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    /// Whether callers should treat this error as "ticker not found".
    ///
    /// Fetch failures surface as unavailability too: no retries are attempted,
    /// so a failed round-trip is indistinguishable from an absent ticker for the
    /// view that requested it.
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. }
                | Self::Network(_)
                | Self::YahooApi(_)
                | Self::InvalidSymbol(_)
        )
    }
}

impl From<yahoo_finance_api::YahooError> for DataError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        Self::YahooApi(err.to_string())
    }
}
