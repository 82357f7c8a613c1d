//! Rendering and export for stockdoc views.
//!
//! Text and Markdown tables for the terminal, and CSV/JSON export through the
//! [`Exporter`] trait.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod render;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter, TableExport, TableRow};
pub use render::{
    chart_to_ascii, chart_to_markdown, dividends_to_ascii, format_value, key_statistics_to_ascii,
    valuation_summary_to_ascii,
};
pub use report::{Report, ReportBuilder, ReportError};
