//! Fundamental metric derivation for stockdoc.
//!
//! Turns normalized period statements into display-ready series: the
//! fundamental catalog ([`MetricDeriver`]), split-adjusted share counts
//! ([`SplitAdjuster`]), trailing-twelve-month daily alignment ([`TtmAligner`])
//! and daily valuation ratios ([`ValuationEngine`]). Series from several
//! tickers are merged by [`Table::align`]. Rolling, lagged and joined series
//! work runs on polars lazy frames.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod derive;
pub mod dividends;
pub mod error;
pub mod frame;
pub mod period;
pub mod registry;
pub mod series;
pub mod split;
pub mod stats;
pub mod ttm;
pub mod valuation;

pub use compare::{Chart, Table, compare_fundamentals};
pub use derive::{FUNDAMENTALS_CHARTS, FundamentalMetric, MetricDeriver};
pub use dividends::{DIVIDEND_CHART, DividendView, NO_DIVIDENDS};
pub use error::{MetricError, Result};
pub use frame::FrameKey;
pub use period::{DateRange, PERIOD_END_GRACE_DAYS, PeriodKey, PeriodRange, period_keys};
pub use series::{DailySeries, DerivedSeries, PeriodValues};
pub use split::{SPLIT_RATIO_THRESHOLD, SplitAdjuster, SplitConfig};
pub use stats::KeyStatistics;
pub use ttm::{Resampling, TTM_WINDOW, TtmAligner};
pub use valuation::{ValuationEngine, ValuationMetric};

// Re-export registry types for convenience
pub use registry::{
    MetricCategory, MetricInfo, available_metrics, get_metric_info, metrics_by_category,
};
