//! stockdoc: fundamentals, comparisons and valuation ratios for listed companies.
//!
//! The umbrella crate wires the pipeline together. [`data`] fetches and
//! normalizes statements and prices, [`metrics`] derives display series and
//! [`output`] renders or exports them. The [`views`] module builds the three
//! dashboards on top:
//!
//! - [`FundamentalsView`]: one ticker's fundamentals charts, dividends and key statistics
//! - [`ComparisonView`]: several tickers side by side, one chart per metric
//! - [`ValuationView`]: a daily valuation ratio per ticker

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod views;

// Re-export main types from sub-crates
pub use stockdoc_data as data;
pub use stockdoc_metrics as metrics;
pub use stockdoc_output as output;

pub use error::{Result, StockdocError};
pub use views::{ComparisonView, FundamentalsView, ValuationView, key_label};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
