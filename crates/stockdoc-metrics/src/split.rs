//! Stock split detection and share-count adjustment.

use crate::error::{MetricError, Result};
use crate::series::DailySeries;
use crate::ttm::{Knot, Resampling, extend_to, resample_daily};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockdoc_data::{FinancialField, PeriodSeries};
use tracing::info;

/// Period-over-period share ratio at or above which a split is assumed.
pub const SPLIT_RATIO_THRESHOLD: f64 = 1.5;

/// Name given to split-adjusted share series.
pub const SHARES_SERIES: &str = "Shares";

/// Configuration for the split adjuster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Split detection threshold (default: 1.5)
    pub threshold: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            threshold: SPLIT_RATIO_THRESHOLD,
        }
    }
}

/// Rescales raw share counts onto a split-adjusted basis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplitAdjuster {
    config: SplitConfig,
}

impl SplitAdjuster {
    /// Adjuster with the given configuration.
    pub const fn with_config(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Resolved multiplier for each period.
    ///
    /// The ratio of a period to its successor counts as a split when it reaches
    /// the threshold. Each period takes the ratio of the next detected split at
    /// or after it; periods with no later split keep a multiplier of 1.
    pub fn ratios(&self, shares: &[f64]) -> Vec<f64> {
        let mut detected: Vec<Option<f64>> = shares
            .iter()
            .enumerate()
            .map(|(i, current)| {
                let next = shares.get(i + 1)?;
                let ratio = current / next;
                (ratio.is_finite() && ratio >= self.config.threshold).then_some(ratio)
            })
            .collect();

        let mut next_split = None;
        for slot in detected.iter_mut().rev() {
            match slot {
                Some(ratio) => next_split = Some(*ratio),
                None => *slot = next_split,
            }
        }

        detected.into_iter().map(|r| r.unwrap_or(1.0)).collect()
    }

    /// Share counts multiplied by their resolved ratios.
    pub fn adjust(&self, shares: &[f64]) -> Vec<f64> {
        shares
            .iter()
            .zip(self.ratios(shares))
            .map(|(count, ratio)| count * ratio)
            .collect()
    }

    /// Split-adjusted share counts at each reported period end.
    ///
    /// Periods that do not report a share count are skipped.
    pub fn adjusted_shares(&self, quarterly: &PeriodSeries) -> Result<Vec<(NaiveDate, f64)>> {
        self.adjust_points(quarterly, None)
    }

    /// Split-adjusted share count for every day from the first report to `as_of`.
    ///
    /// The latest count is carried to `as_of`; each day holds the most recent
    /// reported count.
    pub fn daily_shares(&self, quarterly: &PeriodSeries, as_of: NaiveDate) -> Result<DailySeries> {
        let points = self.adjust_points(quarterly, Some(as_of))?;
        let knots: Vec<Knot> = points.into_iter().map(|(d, v)| (d, Some(v))).collect();
        resample_daily(SHARES_SERIES, &knots, Resampling::ForwardFill)
    }

    fn adjust_points(
        &self,
        quarterly: &PeriodSeries,
        as_of: Option<NaiveDate>,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        let reported: Vec<Knot> = quarterly
            .column(FinancialField::CommonStockSharesOutstanding)
            .into_iter()
            .filter(|(_, v)| v.is_some())
            .collect();

        if reported.is_empty() {
            return Err(MetricError::unavailable(
                quarterly.ticker(),
                SHARES_SERIES,
                FinancialField::CommonStockSharesOutstanding,
            ));
        }

        let knots = match as_of {
            Some(as_of) => extend_to(reported, as_of),
            None => reported,
        };
        let (dates, counts): (Vec<NaiveDate>, Vec<f64>) = knots
            .into_iter()
            .filter_map(|(d, v)| v.map(|v| (d, v)))
            .unzip();

        let ratios = self.ratios(&counts);
        for (i, pair) in counts.windows(2).enumerate() {
            let ratio = pair[0] / pair[1];
            if ratio.is_finite() && ratio >= self.config.threshold {
                info!(
                    ticker = quarterly.ticker(),
                    date = %dates[i],
                    ratio,
                    "share-count split detected"
                );
            }
        }

        Ok(dates
            .into_iter()
            .zip(counts.iter().zip(ratios).map(|(c, r)| c * r))
            .collect())
    }
}
