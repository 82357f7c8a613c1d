//! Errors surfaced by the stockdoc views.

use stockdoc_data::DataError;
use stockdoc_metrics::MetricError;
use stockdoc_output::{ExportError, ReportError};
use thiserror::Error;

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, StockdocError>;

/// Errors raised while building or writing a view.
#[derive(Debug, Error)]
pub enum StockdocError {
    /// Fetching or normalizing store data failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// A metric or range could not be resolved
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Writing an export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Building a report failed
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl StockdocError {
    /// Whether the view should show "not in the database" rather than fail.
    pub const fn is_unavailable(&self) -> bool {
        match self {
            Self::Data(e) => e.is_unavailable(),
            Self::Metric(e) => matches!(
                e,
                MetricError::DataUnavailable { .. } | MetricError::EmptySeries { .. }
            ),
            Self::Export(_) | Self::Report(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        let missing: StockdocError = DataError::unavailable("ZZZZ", "not in store").into();
        assert!(missing.is_unavailable());

        let range: StockdocError = MetricError::InvalidRange {
            from: "2024".to_string(),
            to: "2020".to_string(),
        }
        .into();
        assert!(!range.is_unavailable());
    }
}
