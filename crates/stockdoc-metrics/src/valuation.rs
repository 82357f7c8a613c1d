//! Daily price-to-fundamental ratios.
//!
//! The engine joins three daily series on date: adjusted close, split-adjusted
//! shares and a trailing-twelve-month fundamental. Only days where all three
//! are defined produce a ratio, and a ratio that is not finite is dropped.

use crate::compare::Chart;
use crate::error::{MetricError, Result};
use crate::frame::{DATE, collect_knots, daily_frame, knots_frame};
use crate::period::DateRange;
use crate::series::DailySeries;
use crate::split::{SPLIT_RATIO_THRESHOLD, SplitAdjuster, SplitConfig};
use crate::ttm::{Knot, TtmAligner};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockdoc_data::{FinancialField, PeriodSeries, PriceSeries};
use tracing::{debug, warn};

const PRICE: &str = "price";
const SHARES: &str = "shares";
const DENOMINATOR: &str = "denominator";
const RATIO: &str = "ratio";

/// Ratio shown in the valuation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuationMetric {
    /// Price to earnings
    PE,
    /// Price to free cash flow
    PFCF,
    /// Price to operating cash flow
    POCF,
    /// Price to EBITDA
    PEBITDA,
    /// Price to earnings before tax
    PEBT,
    /// Price to sales
    PS,
}

impl ValuationMetric {
    /// Every ratio, in menu order.
    pub const ALL: [Self; 6] = [
        Self::PE,
        Self::PFCF,
        Self::POCF,
        Self::PEBITDA,
        Self::PEBT,
        Self::PS,
    ];

    /// Short code accepted on the command line.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PE => "pe",
            Self::PFCF => "pfcf",
            Self::POCF => "pocf",
            Self::PEBITDA => "pebitda",
            Self::PEBT => "pebt",
            Self::PS => "ps",
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PE => "Price to Earnings (P/E)",
            Self::PFCF => "Price to Free Cash Flow (P/FCF)",
            Self::POCF => "Price to Operating Cash Flow (P/OCF)",
            Self::PEBITDA => "Price to EBITDA (P/EBITDA)",
            Self::PEBT => "Price to Earnings Before Tax (P/EBT)",
            Self::PS => "Price to Sales (P/S)",
        }
    }

    /// Store fields the denominator reads.
    pub const fn required_fields(&self) -> &'static [FinancialField] {
        use FinancialField as F;
        match self {
            Self::PE => &[F::NetIncome],
            Self::PFCF => &[F::OperatingCashflow, F::CapitalExpenditures],
            Self::POCF => &[F::OperatingCashflow],
            Self::PEBITDA => &[F::OperatingIncome, F::DepreciationDepletionAndAmortization],
            Self::PEBT => &[F::IncomeBeforeTax],
            Self::PS => &[F::TotalRevenue],
        }
    }

    /// Quarterly denominator values before trailing aggregation.
    ///
    /// A quarter missing any input is undefined. Fails when an input is not
    /// reported in any quarter.
    pub fn quarterly_values(&self, quarterly: &PeriodSeries) -> Result<Vec<Knot>> {
        use FinancialField as F;
        for field in self.required_fields() {
            if quarterly.lacks(*field) {
                return Err(MetricError::unavailable(quarterly.ticker(), self.name(), *field));
            }
        }

        Ok(quarterly
            .records()
            .iter()
            .map(|r| {
                let value = match self {
                    Self::PE => r.value(F::NetIncome),
                    Self::PFCF => r
                        .value(F::OperatingCashflow)
                        .zip(r.value(F::CapitalExpenditures))
                        .map(|(ocf, capex)| ocf - capex),
                    Self::POCF => r.value(F::OperatingCashflow),
                    Self::PEBITDA => r
                        .value(F::OperatingIncome)
                        .zip(r.value(F::DepreciationDepletionAndAmortization))
                        .map(|(operating, da)| operating + da),
                    Self::PEBT => r.value(F::IncomeBeforeTax),
                    Self::PS => r.value(F::TotalRevenue),
                };
                (r.end_date, value)
            })
            .collect())
    }
}

impl fmt::Display for ValuationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValuationMetric {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(wanted) || m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MetricError::UnknownMetric(s.to_string()))
    }
}

/// Computes daily valuation ratios as of one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationEngine {
    aligner: TtmAligner,
    splits: SplitAdjuster,
}

impl ValuationEngine {
    /// Engine whose daily series extend to `as_of`.
    pub const fn new(as_of: NaiveDate) -> Self {
        Self {
            aligner: TtmAligner::new(as_of),
            splits: SplitAdjuster::with_config(SplitConfig {
                threshold: SPLIT_RATIO_THRESHOLD,
            }),
        }
    }

    /// Builder: override split detection.
    pub const fn with_split_adjuster(mut self, splits: SplitAdjuster) -> Self {
        self.splits = splits;
        self
    }

    /// Day the daily series end on.
    pub const fn as_of(&self) -> NaiveDate {
        self.aligner.as_of()
    }

    /// Daily trailing-twelve-month denominator.
    pub fn daily_metric(&self, metric: ValuationMetric, quarterly: &PeriodSeries) -> Result<DailySeries> {
        let knots = metric.quarterly_values(quarterly)?;
        self.aligner.align(metric.code(), &knots)
    }

    /// Daily market capitalization over the trailing metric, named after the ticker.
    pub fn daily_ratio(
        &self,
        metric: ValuationMetric,
        quarterly: &PeriodSeries,
        prices: &PriceSeries,
    ) -> Result<DailySeries> {
        let shares = self.splits.daily_shares(quarterly, self.as_of())?;
        let denominator = self.daily_metric(metric, quarterly)?;

        let closes: Vec<Knot> = prices.iter().map(|(d, p)| (d, Some(p))).collect();
        let frame = knots_frame(PRICE, &closes)?
            .join(
                daily_frame(SHARES, &shares)?,
                [col(DATE)],
                [col(DATE)],
                JoinArgs::new(JoinType::Inner),
            )
            .join(
                daily_frame(DENOMINATOR, &denominator)?,
                [col(DATE)],
                [col(DATE)],
                JoinArgs::new(JoinType::Inner),
            )
            .select([
                col(DATE),
                (col(PRICE) * col(SHARES) / col(DENOMINATOR)).alias(RATIO),
            ]);

        // Non-finite ratios (zero denominator) are dropped on insert.
        let ratio = DailySeries::from_points(
            quarterly.ticker(),
            collect_knots(frame, RATIO)?
                .into_iter()
                .filter_map(|(d, v)| v.map(|v| (d, v))),
        );

        debug!(
            ticker = quarterly.ticker(),
            metric = metric.code(),
            days = ratio.len(),
            "valuation ratio computed"
        );
        Ok(ratio)
    }

    /// One column per ticker, restricted to `range`.
    ///
    /// A ticker whose ratio cannot be computed is reported in the chart's
    /// failures and the others still chart.
    pub fn compare(
        &self,
        metric: ValuationMetric,
        inputs: &[(&PeriodSeries, &PriceSeries)],
        range: &DateRange,
    ) -> Result<Chart<NaiveDate>> {
        let mut columns = Vec::with_capacity(inputs.len());
        let mut unavailable = Vec::new();
        for (quarterly, prices) in inputs {
            match self.daily_ratio(metric, quarterly, prices) {
                Ok(series) => columns.push(series.filtered(|d| range.contains(d))),
                Err(e) => {
                    warn!(ticker = quarterly.ticker(), metric = metric.code(), error = %e, "ticker skipped");
                    unavailable.push(e);
                }
            }
        }
        Chart::new(metric.name(), columns, unavailable)
    }
}
