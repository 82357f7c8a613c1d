//! Error types for metric derivation.

use polars::prelude::PolarsError;
use stockdoc_data::FinancialField;
use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricError>;

/// Errors raised while deriving a metric.
///
/// Undefined values (division by zero, short rolling windows) are not errors;
/// they are simply absent from the derived series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// A field the metric needs is not reported in any period of the window
    #[error("{metric} unavailable for {ticker}: {field} is not reported")]
    DataUnavailable {
        /// Ticker being derived
        ticker: String,
        /// Metric that could not be computed
        metric: String,
        /// Missing source field
        field: FinancialField,
    },

    /// The selected window contains no periods
    #[error("No periods for {ticker} in the selected range")]
    EmptySeries {
        /// Ticker being derived
        ticker: String,
    },

    /// Range start lies after its end
    #[error("Invalid range: {from} is after {to}")]
    InvalidRange {
        /// Range start label
        from: String,
        /// Range end label
        to: String,
    },

    /// Period label that cannot be parsed
    #[error("Invalid period '{0}', expected YYYY or Q# YYYY")]
    InvalidPeriod(String),

    /// Metric name or code outside the catalog
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Series computation failed inside polars
    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<PolarsError> for MetricError {
    fn from(err: PolarsError) -> Self {
        Self::Polars(err.to_string())
    }
}

impl MetricError {
    /// Build a [`MetricError::DataUnavailable`].
    pub fn unavailable(
        ticker: impl Into<String>,
        metric: impl Into<String>,
        field: FinancialField,
    ) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            metric: metric.into(),
            field,
        }
    }
}
