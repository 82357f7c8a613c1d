//! Report generation for stockdoc views.

use crate::export::{ExportError, ExportFormat, Exporter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No ticker was given.
    #[error("A report needs at least one ticker")]
    NoTickers,
}

/// A rendered view, ready to be written out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// View that produced the report, e.g. `fundamentals`.
    pub view: String,

    /// Tickers covered.
    pub tickers: Vec<String>,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(view: String, tickers: Vec<String>, contents: serde_json::Value) -> Self {
        Self {
            view,
            tickers,
            timestamp: Utc::now(),
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Exporter for Report {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "reports export as JSON only".to_string(),
            )),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    view: Option<String>,
    tickers: Vec<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the view name.
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Add a ticker.
    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.tickers.push(ticker.into());
        self
    }

    /// Add several tickers.
    pub fn tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers.extend(tickers.into_iter().map(Into::into));
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Serialize `value` as the report contents.
    pub fn contents_from<T: Serialize>(self, value: &T) -> Result<Self, ReportError> {
        Ok(self.contents(serde_json::to_value(value)?))
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        if self.tickers.is_empty() {
            return Err(ReportError::NoTickers);
        }
        Ok(Report::new(
            self.view.unwrap_or_default(),
            self.tickers,
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            "fundamentals".to_string(),
            vec!["AAPL".to_string()],
            serde_json::json!({"test": "data"}),
        );

        assert_eq!(report.view, "fundamentals");
        assert_eq!(report.tickers, vec!["AAPL"]);
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .view("compare")
            .tickers(["MSFT", "GOOG"])
            .contents(serde_json::json!({"key": "value"}))
            .build()
            .unwrap();

        assert_eq!(report.tickers, vec!["MSFT", "GOOG"]);
        assert!(report.to_json().unwrap().contains("\"compare\""));
    }

    #[test]
    fn test_report_requires_ticker() {
        assert!(matches!(
            ReportBuilder::new().view("compare").build(),
            Err(ReportError::NoTickers)
        ));
    }

    #[test]
    fn test_report_rejects_csv() {
        let report = ReportBuilder::new().ticker("AAPL").build().unwrap();
        assert!(report.export_to_string(ExportFormat::Csv).is_err());
        assert!(report.export_to_string(ExportFormat::Json).is_ok());
    }
}
