//! Export functionality for stockdoc tables.
//!
//! Charts are flattened into [`TableExport`] records that serialize to CSV
//! (header `period,<col>..`, blank cells for undefined values) or JSON.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use stockdoc_metrics::{Chart, KeyStatistics};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One row of an exported table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRow {
    /// Period label or ISO date.
    pub period: String,

    /// Cell per column, `None` where undefined.
    pub values: Vec<Option<f64>>,
}

/// A chart flattened for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableExport {
    /// Chart title.
    pub title: String,

    /// Column headers after the period column.
    pub columns: Vec<String>,

    /// Rows in chronological order.
    pub rows: Vec<TableRow>,

    /// Messages for columns that could not be computed.
    pub unavailable: Vec<String>,
}

impl TableExport {
    /// Flatten `chart`.
    pub fn from_chart<K>(chart: &Chart<K>) -> Self
    where
        K: Ord + Copy + Debug + Display,
    {
        Self {
            title: chart.title.clone(),
            columns: chart.table.columns().to_vec(),
            rows: chart
                .table
                .rows()
                .map(|(key, cells)| TableRow {
                    period: key.to_string(),
                    values: cells.to_vec(),
                })
                .collect(),
            unavailable: chart.unavailable.iter().map(ToString::to_string).collect(),
        }
    }

    fn write_csv<W: Write>(&self, wtr: &mut csv::Writer<W>) -> Result<(), ExportError> {
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("period");
        header.extend(self.columns.iter().map(String::as_str));
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.period.clone());
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        Ok(())
    }
}

fn csv_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for TableExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                self.write_csv(&mut wtr)?;
                csv_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<TableExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();
                for table in self {
                    // Each table is its own CSV block under a title comment
                    output.push_str(&format!("# {}\n", table.title));
                    let mut wtr = csv::Writer::from_writer(vec![]);
                    table.write_csv(&mut wtr)?;
                    output.push_str(&csv_string(wtr)?);
                    output.push('\n');
                }
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for KeyStatistics {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["statistic", "value"])?;
                for (label, value) in self.rows() {
                    let shown = value.map(|v| v.to_string()).unwrap_or_default();
                    wtr.write_record([label, shown.as_str()])?;
                }
                csv_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
