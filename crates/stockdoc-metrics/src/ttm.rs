//! Trailing-twelve-month aggregation and daily resampling.
//!
//! Quarterly figures become a daily "as of the latest report" series in three
//! steps: a rolling four-quarter sum, a synthetic point on the as-of date
//! carrying the latest sum forward, and a resample onto every calendar day.
//! The sum and the resample run as polars expressions.

use crate::error::Result;
use crate::frame::{DATE, calendar, collect_knots, knots_frame};
use crate::series::DailySeries;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quarters in a trailing-twelve-month window.
pub const TTM_WINDOW: usize = 4;

/// Date-stamped value that may be undefined.
pub type Knot = (NaiveDate, Option<f64>);

const VALUE: &str = "value";
const KNOT: &str = "knot";

/// How sparse points are spread over the daily calendar.
///
/// Both methods stop at an undefined knot: days from an undefined knot up to
/// the next defined one have no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resampling {
    /// Each day takes the most recent point at or before it
    ForwardFill,
    /// Straight line between defined points, the last one held until the next knot
    Linear,
}

impl Resampling {
    /// Forward fill when any defined value is negative, linear otherwise.
    pub fn for_knots(knots: &[Knot]) -> Self {
        if knots.iter().any(|(_, v)| v.is_some_and(|v| v < 0.0)) {
            Self::ForwardFill
        } else {
            Self::Linear
        }
    }
}

/// Rolling sum over `window` consecutive points.
///
/// A sum is undefined for the first `window - 1` points and wherever a value
/// inside its window is undefined.
pub fn rolling_sum(knots: &[Knot], window: usize) -> Result<Vec<Knot>> {
    if window == 0 {
        return Ok(knots.iter().map(|(d, _)| (*d, None)).collect());
    }

    let frame = knots_frame(VALUE, knots)?.with_columns([col(VALUE).rolling_sum(
        RollingOptionsFixedWindow {
            window_size: window,
            min_periods: window,
            ..Default::default()
        },
    )]);
    Ok(collect_knots(frame, VALUE)?)
}

/// Append a point on `as_of` repeating the last value, unless the series
/// already reaches that day.
pub fn extend_to(mut knots: Vec<Knot>, as_of: NaiveDate) -> Vec<Knot> {
    if let Some(&(last_date, last_value)) = knots.last()
        && last_date < as_of
    {
        knots.push((as_of, last_value));
    }
    knots
}

/// Spread `knots` over every day from the first to the last knot.
///
/// `knots` must be in ascending date order.
pub fn resample_daily(name: &str, knots: &[Knot], method: Resampling) -> Result<DailySeries> {
    let (Some(&(start, _)), Some(&(end, _))) = (knots.first(), knots.last()) else {
        return Ok(DailySeries::new(name));
    };

    // Each day belongs to the segment of the latest knot at or before it.
    let carried = col(VALUE)
        .fill_null_with_strategy(FillNullStrategy::Forward(None))
        .over([col(KNOT)]);
    let filled = match method {
        Resampling::ForwardFill => carried,
        Resampling::Linear => col(VALUE)
            .interpolate(InterpolationMethod::Linear)
            .fill_null(carried),
    };

    let frame = calendar(start, end)?
        .join(
            knots_frame(VALUE, knots)?.with_row_index(KNOT, None),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([DATE], Default::default())
        .with_columns([col(KNOT).fill_null_with_strategy(FillNullStrategy::Forward(None))])
        .select([col(DATE), filled.alias(VALUE)]);

    let points = collect_knots(frame, VALUE)?
        .into_iter()
        .filter_map(|(d, v)| v.map(|v| (d, v)));
    Ok(DailySeries::from_points(name, points))
}

/// Converts quarterly figures into a daily trailing-twelve-month series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtmAligner {
    window: usize,
    as_of: NaiveDate,
}

impl TtmAligner {
    /// Aligner with a four-quarter window extending to `as_of`.
    pub const fn new(as_of: NaiveDate) -> Self {
        Self {
            window: TTM_WINDOW,
            as_of,
        }
    }

    /// Builder: override the window length.
    pub const fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Day the synthetic latest point is placed on.
    pub const fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Trailing sums at each quarter end.
    pub fn trailing(&self, quarterly: &[Knot]) -> Result<Vec<Knot>> {
        rolling_sum(quarterly, self.window)
    }

    /// Trailing sums as a series, undefined quarters omitted.
    pub fn trailing_series(&self, name: &str, quarterly: &[Knot]) -> Result<DailySeries> {
        Ok(DailySeries::from_points(
            name,
            self.trailing(quarterly)?
                .into_iter()
                .filter_map(|(d, v)| v.map(|v| (d, v))),
        ))
    }

    /// Full pipeline: trailing sums, as-of point, daily resample.
    pub fn align(&self, name: &str, quarterly: &[Knot]) -> Result<DailySeries> {
        let knots = extend_to(self.trailing(quarterly)?, self.as_of);
        let method = Resampling::for_knots(&knots);
        debug!(series = name, ?method, knots = knots.len(), "resampling to daily");
        resample_daily(name, &knots, method)
    }
}
