//! Conversions between derived series and polars frames.
//!
//! A series enters polars as a key column plus one nullable `f64` column; an
//! undefined point is a null. Rolling sums, lags, resampling and joins all run
//! as lazy expressions over these frames, and results come back through
//! [`DerivedSeries`].

use crate::period::PeriodKey;
use crate::series::{DailySeries, DerivedSeries};
use crate::ttm::Knot;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Date column of daily frames.
pub(crate) const DATE: &str = "date";

/// Key column of aligned tables.
pub(crate) const KEY: &str = "key";

/// `num_days_from_ce` of 1970-01-01, day zero of the polars `Date` type.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Series keys that can be joined on inside polars.
///
/// The encoding must preserve order so a sorted key column is a sorted table.
pub trait FrameKey: Ord + Copy + std::fmt::Debug {
    /// Order-preserving integer code
    fn encode(self) -> i64;
    /// Inverse of [`FrameKey::encode`]
    fn decode(code: i64) -> Option<Self>;
}

impl FrameKey for NaiveDate {
    fn encode(self) -> i64 {
        i64::from(date_to_days(self))
    }

    fn decode(code: i64) -> Option<Self> {
        i32::try_from(code).ok().and_then(days_to_date)
    }
}

impl FrameKey for PeriodKey {
    fn encode(self) -> i64 {
        match self {
            Self::Year(year) => i64::from(year) * 10,
            Self::Quarter { year, quarter } => i64::from(year) * 10 + i64::from(quarter),
        }
    }

    fn decode(code: i64) -> Option<Self> {
        let year = i32::try_from(code.div_euclid(10)).ok()?;
        match u32::try_from(code.rem_euclid(10)).ok()? {
            0 => Some(Self::Year(year)),
            quarter @ 1..=4 => Some(Self::Quarter { year, quarter }),
            _ => None,
        }
    }
}

impl FrameKey for i32 {
    fn encode(self) -> i64 {
        i64::from(self)
    }

    fn decode(code: i64) -> Option<Self> {
        Self::try_from(code).ok()
    }
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

fn date_column(days: Vec<i32>) -> PolarsResult<Column> {
    Ok(Series::new(DATE.into(), days).cast(&DataType::Date)?.into())
}

/// Frame of `date` and `value`, null where a knot is undefined.
pub(crate) fn knots_frame(value: &str, knots: &[Knot]) -> PolarsResult<LazyFrame> {
    let days: Vec<i32> = knots.iter().map(|(d, _)| date_to_days(*d)).collect();
    let values: Vec<Option<f64>> = knots.iter().map(|(_, v)| *v).collect();
    let df = DataFrame::new(vec![
        date_column(days)?,
        Series::new(value.into(), values).into(),
    ])?;
    Ok(df.lazy())
}

/// Frame of `date` and `value` holding every point of `series`.
pub(crate) fn daily_frame(value: &str, series: &DailySeries) -> PolarsResult<LazyFrame> {
    let knots: Vec<Knot> = series.iter().map(|(d, v)| (d, Some(v))).collect();
    knots_frame(value, &knots)
}

/// One row per calendar day from `start` through `end`.
pub(crate) fn calendar(start: NaiveDate, end: NaiveDate) -> PolarsResult<LazyFrame> {
    let days: Vec<i32> = (date_to_days(start)..=date_to_days(end)).collect();
    Ok(DataFrame::new(vec![date_column(days)?])?.lazy())
}

/// Collect `(date, value)` rows, nulls kept as `None`.
pub(crate) fn collect_knots(frame: LazyFrame, value: &str) -> PolarsResult<Vec<Knot>> {
    let df = frame.collect()?;
    let days = df.column(DATE)?.cast(&DataType::Int32)?;
    let values = df.column(value)?.f64()?;
    Ok(days
        .i32()?
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(day, value)| Some((days_to_date(day?)?, value)))
        .collect())
}

/// Single-column frame over an ordered sequence.
pub(crate) fn values_frame(value: &str, values: Vec<Option<f64>>) -> PolarsResult<LazyFrame> {
    Ok(DataFrame::new(vec![Series::new(value.into(), values).into()])?.lazy())
}

/// Collect one nullable column in row order.
pub(crate) fn collect_values(frame: LazyFrame, value: &str) -> PolarsResult<Vec<Option<f64>>> {
    let df = frame.collect()?;
    Ok(df.column(value)?.f64()?.into_iter().collect())
}

/// Frame of encoded `key` and `column` holding every point of `series`.
pub(crate) fn keyed_frame<K: FrameKey>(
    column: &str,
    series: &DerivedSeries<K>,
) -> PolarsResult<LazyFrame> {
    let keys: Vec<i64> = series.keys().map(FrameKey::encode).collect();
    let df = DataFrame::new(vec![
        Series::new(KEY.into(), keys).into(),
        Series::new(column.into(), series.values()).into(),
    ])?;
    Ok(df.lazy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(1970, 1, 1), 0)]
    #[case(date(1970, 1, 2), 1)]
    #[case(date(1969, 12, 31), -1)]
    fn test_polars_day_numbers(#[case] day: NaiveDate, #[case] expected: i32) {
        assert_eq!(date_to_days(day), expected);
        assert_eq!(days_to_date(expected), Some(day));
    }

    #[test]
    fn test_period_key_codes_keep_order() {
        let q4 = PeriodKey::Quarter { year: 2022, quarter: 4 };
        let q1 = PeriodKey::Quarter { year: 2023, quarter: 1 };
        assert!(q4.encode() < q1.encode());
        assert_eq!(PeriodKey::decode(q1.encode()), Some(q1));
        assert_eq!(PeriodKey::decode(PeriodKey::Year(2023).encode()), Some(PeriodKey::Year(2023)));
        assert_eq!(PeriodKey::decode(20235), None);
    }

    #[test]
    fn test_knots_survive_a_frame() {
        let knots = vec![(date(2024, 1, 1), Some(1.5)), (date(2024, 1, 3), None)];
        let back = collect_knots(knots_frame("v", &knots).unwrap(), "v").unwrap();
        assert_eq!(back, knots);
    }

    #[test]
    fn test_calendar_is_inclusive() {
        let df = calendar(date(2024, 2, 27), date(2024, 3, 1))
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.column(DATE).unwrap().dtype(), &DataType::Date);
    }
}
