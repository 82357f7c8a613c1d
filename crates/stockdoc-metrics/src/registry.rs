//! Metric Registry
//!
//! Central registry of every metric the views can draw. Allows lookup by code
//! and grouping by statement category.

use crate::derive::FundamentalMetric;
use crate::valuation::ValuationMetric;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use stockdoc_data::FinancialField;

/// Code of the dividend-per-share series, which reads the dividend history
/// rather than statement fields.
pub const DIVIDENDS_PER_SHARE: &str = "dividends_per_share";

/// Available metric categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricCategory {
    /// Income statement lines and growth
    Income,
    /// Cash flow lines
    CashFlow,
    /// Balance sheet lines
    BalanceSheet,
    /// Margins over revenue
    Margin,
    /// Dividend payouts
    Dividend,
    /// Price over a trailing fundamental
    Valuation,
}

impl MetricCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Income,
        Self::CashFlow,
        Self::BalanceSheet,
        Self::Margin,
        Self::Dividend,
        Self::Valuation,
    ];
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Income => "Income",
            Self::CashFlow => "Cash Flow",
            Self::BalanceSheet => "Balance Sheet",
            Self::Margin => "Margin",
            Self::Dividend => "Dividend",
            Self::Valuation => "Valuation",
        })
    }
}

/// Metric metadata
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    /// Metric code (unique identifier)
    pub name: &'static str,
    /// Metric category
    pub category: MetricCategory,
    /// Brief description of what the metric measures
    pub description: &'static str,
    /// Statement fields the metric reads
    pub required_fields: &'static [FinancialField],
}

const fn fundamental_info(metric: FundamentalMetric) -> MetricInfo {
    use FundamentalMetric::*;
    let (category, description) = match metric {
        Revenue => (MetricCategory::Income, "Total revenue"),
        NetIncome => (MetricCategory::Income, "Net income"),
        RevenueGrowth => (MetricCategory::Income, "Period-over-period revenue change, percent"),
        Ebitda => (
            MetricCategory::Income,
            "Operating income plus depreciation and amortization",
        ),
        Ebit => (MetricCategory::Income, "Operating income"),
        InterestExpense => (MetricCategory::Income, "Interest expense"),
        Capex => (MetricCategory::CashFlow, "Capital expenditures"),
        FreeCashFlow => (
            MetricCategory::CashFlow,
            "Operating cash flow minus capital expenditures",
        ),
        Shares => (MetricCategory::BalanceSheet, "Split-adjusted shares outstanding"),
        Cash => (MetricCategory::BalanceSheet, "Cash and short-term investments"),
        LongTermDebt => (
            MetricCategory::BalanceSheet,
            "Non-current long-term debt, total long-term debt when not reported",
        ),
        GrossMargin => (MetricCategory::Margin, "Gross profit over revenue, percent"),
        NetMargin => (MetricCategory::Margin, "Net income over revenue, percent"),
    };
    MetricInfo {
        name: metric.code(),
        category,
        description,
        required_fields: metric.required_fields(),
    }
}

const fn valuation_info(metric: ValuationMetric) -> MetricInfo {
    MetricInfo {
        name: metric.code(),
        category: MetricCategory::Valuation,
        description: metric.name(),
        required_fields: metric.required_fields(),
    }
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    let mut metrics: Vec<MetricInfo> = FundamentalMetric::ALL
        .iter()
        .map(|m| fundamental_info(*m))
        .collect();
    metrics.push(MetricInfo {
        name: DIVIDENDS_PER_SHARE,
        category: MetricCategory::Dividend,
        description: "Dividend payouts summed per quarter or calendar year",
        required_fields: &[],
    });
    metrics.extend(ValuationMetric::ALL.into_iter().map(valuation_info));
    metrics
}

/// Get metrics by category
pub fn metrics_by_category(category: MetricCategory) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|m| m.category == category)
        .collect()
}

/// Get metric info by code
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    available_metrics().into_iter().find(|m| m.name == name)
}

/// List all metric codes
pub fn list_metric_names() -> Vec<&'static str> {
    available_metrics().into_iter().map(|m| m.name).collect()
}

/// Count metrics by category
pub fn count_by_category() -> HashMap<MetricCategory, usize> {
    let mut counts = HashMap::new();
    for metric in available_metrics() {
        *counts.entry(metric.category).or_insert(0) += 1;
    }
    counts
}
