//! Period keys, labels and range selection.

use crate::error::{MetricError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockdoc_data::{Granularity, PeriodRecord, PeriodSeries};
use tracing::debug;

/// Days a reported period may close after its calendar period and still be
/// labelled with it. Covers 52/53-week fiscal calendars.
pub const PERIOD_END_GRACE_DAYS: i64 = 7;

/// Axis key of a period-indexed series: a calendar year or a calendar quarter.
///
/// Ordering is chronological within one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    /// Calendar year of the period close
    Year(i32),
    /// Calendar quarter of the period close
    Quarter {
        /// Calendar year
        year: i32,
        /// Quarter, 1 through 4
        quarter: u32,
    },
}

impl PeriodKey {
    /// Key of a period closing on `date`.
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Annual => Self::Year(date.year()),
            Granularity::Quarterly => Self::Quarter {
                year: date.year(),
                quarter: date.month0() / 3 + 1,
            },
        }
    }

    /// Key of a reporting period closing on `date`.
    ///
    /// A close within [`PERIOD_END_GRACE_DAYS`] of the previous calendar
    /// period end belongs to that period: a quarter closing 2023-04-01 is Q1.
    pub fn for_period_end(date: NaiveDate, granularity: Granularity) -> Self {
        let anchor = date
            .checked_sub_signed(Duration::days(PERIOD_END_GRACE_DAYS))
            .unwrap_or(date);
        Self::for_date(anchor, granularity)
    }

    /// Key of a normalized record.
    pub fn for_record(record: &PeriodRecord, granularity: Granularity) -> Self {
        Self::for_period_end(record.end_date, granularity)
    }

    /// Key one period later.
    pub const fn next(self) -> Self {
        match self {
            Self::Year(year) => Self::Year(year + 1),
            Self::Quarter { year, quarter: 4 } => Self::Quarter {
                year: year + 1,
                quarter: 1,
            },
            Self::Quarter { year, quarter } => Self::Quarter {
                year,
                quarter: quarter + 1,
            },
        }
    }

    /// Calendar year of the key.
    pub const fn year(&self) -> i32 {
        match self {
            Self::Year(year) | Self::Quarter { year, .. } => *year,
        }
    }

    /// Display label: `2023` or `Q3 2023`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Express this key in `granularity`, as the first or last period it covers.
    const fn coerce(self, granularity: Granularity, start: bool) -> Self {
        match (self, granularity) {
            (Self::Year(year), Granularity::Quarterly) => Self::Quarter {
                year,
                quarter: if start { 1 } else { 4 },
            },
            (Self::Quarter { year, .. }, Granularity::Annual) => Self::Year(year),
            (key, _) => key,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{}", year),
            Self::Quarter { year, quarter } => write!(f, "Q{} {}", quarter, year),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = MetricError;

    /// Parses `2023`, `Q3 2023`, `2023Q3` and `2023-Q3`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MetricError::InvalidPeriod(s.to_string());
        let text = s.trim().to_ascii_uppercase();

        if let Ok(year) = text.parse::<i32>() {
            return Ok(Self::Year(year));
        }

        let (quarter, year) = if let Some(rest) = text.strip_prefix('Q') {
            rest.split_once(' ').ok_or_else(invalid)?
        } else {
            let (year, quarter) = text.split_once('Q').ok_or_else(invalid)?;
            (quarter, year.trim_end_matches('-'))
        };

        let year = year.trim().parse::<i32>().map_err(|_| invalid())?;
        let quarter = quarter.trim().parse::<u32>().map_err(|_| invalid())?;
        if !(1..=4).contains(&quarter) {
            return Err(invalid());
        }
        Ok(Self::Quarter { year, quarter })
    }
}

/// One key per record of `series`, strictly increasing.
///
/// When two records land on the same label the later one moves to the next
/// free period, so no record is ever hidden behind another.
pub fn period_keys(series: &PeriodSeries) -> Vec<PeriodKey> {
    let granularity = series.granularity();
    let mut keys: Vec<PeriodKey> = Vec::with_capacity(series.len());
    for record in series.records() {
        let mut key = PeriodKey::for_record(record, granularity);
        if let Some(&previous) = keys.last()
            && key <= previous
        {
            debug!(
                ticker = series.ticker(),
                end_date = %record.end_date,
                label = %key,
                "period label already taken, shifting to the next period"
            );
            key = previous.next();
        }
        keys.push(key);
    }
    keys
}

/// Inclusive window of periods. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    /// First period kept
    pub from: Option<PeriodKey>,
    /// Last period kept
    pub to: Option<PeriodKey>,
}

impl PeriodRange {
    /// Window covering everything.
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Window between two keys, inclusive.
    pub const fn between(from: Option<PeriodKey>, to: Option<PeriodKey>) -> Self {
        Self { from, to }
    }

    /// Window spanning every period of `series`.
    pub fn spanning(series: &PeriodSeries) -> Self {
        let keys = period_keys(series);
        Self {
            from: keys.first().copied(),
            to: keys.last().copied(),
        }
    }

    /// Whether both ends are open.
    pub const fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Rewrite the bounds in `granularity` and check their order.
    ///
    /// A year bound on a quarterly series covers the whole year.
    pub fn resolve(&self, granularity: Granularity) -> Result<Self> {
        let from = self.from.map(|k| k.coerce(granularity, true));
        let to = self.to.map(|k| k.coerce(granularity, false));
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(MetricError::InvalidRange {
                from: from.label(),
                to: to.label(),
            });
        }
        Ok(Self { from, to })
    }

    /// Whether `key` lies inside the window.
    pub fn contains(&self, key: &PeriodKey) -> bool {
        self.from.is_none_or(|from| *key >= from) && self.to.is_none_or(|to| *key <= to)
    }
}

/// Inclusive window of calendar days, used for daily series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day kept
    pub from: Option<NaiveDate>,
    /// Last day kept
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Window between two days, inclusive.
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(MetricError::InvalidRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// Whether `date` lies inside the window.
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.from.is_none_or(|from| *date >= from) && self.to.is_none_or(|to| *date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2023, 3, 31), "Q1 2023")]
    #[case(date(2023, 4, 1), "Q2 2023")]
    #[case(date(2023, 9, 30), "Q3 2023")]
    #[case(date(2023, 12, 31), "Q4 2023")]
    fn test_quarter_labels(#[case] end: NaiveDate, #[case] expected: &str) {
        assert_eq!(PeriodKey::for_date(end, Granularity::Quarterly).label(), expected);
    }

    #[test]
    fn test_year_label() {
        assert_eq!(
            PeriodKey::for_date(date(2022, 9, 24), Granularity::Annual).label(),
            "2022"
        );
    }

    #[rstest]
    #[case(date(2023, 4, 1), "Q1 2023")]
    #[case(date(2023, 7, 1), "Q2 2023")]
    #[case(date(2022, 9, 24), "Q3 2022")]
    #[case(date(2023, 4, 15), "Q2 2023")]
    fn test_fiscal_period_end_labels(#[case] end: NaiveDate, #[case] expected: &str) {
        assert_eq!(
            PeriodKey::for_period_end(end, Granularity::Quarterly).label(),
            expected
        );
    }

    fn quarterly(ends: &[NaiveDate]) -> PeriodSeries {
        PeriodSeries::from_records(
            "ACME",
            Granularity::Quarterly,
            ends.iter().map(|end| PeriodRecord::new(*end)).collect(),
        )
    }

    #[test]
    fn test_period_keys_follow_52_week_calendar() {
        let series = quarterly(&[date(2023, 4, 1), date(2023, 7, 1), date(2023, 9, 30)]);
        let labels: Vec<String> = period_keys(&series).iter().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["Q1 2023", "Q2 2023", "Q3 2023"]);
    }

    #[test]
    fn test_period_keys_never_share_a_label() {
        // Transition period: two closes inside Q3
        let series = quarterly(&[date(2023, 6, 30), date(2023, 8, 15), date(2023, 9, 30)]);
        let keys = period_keys(&series);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[1], PeriodKey::Quarter { year: 2023, quarter: 3 });
        assert_eq!(keys[2], PeriodKey::Quarter { year: 2023, quarter: 4 });
        assert_eq!(PeriodRange::spanning(&series).to, Some(keys[2]));
    }

    #[test]
    fn test_next_period() {
        assert_eq!(
            PeriodKey::Quarter { year: 2022, quarter: 4 }.next(),
            PeriodKey::Quarter { year: 2023, quarter: 1 }
        );
        assert_eq!(PeriodKey::Year(2022).next(), PeriodKey::Year(2023));
    }

    #[rstest]
    #[case("2021", PeriodKey::Year(2021))]
    #[case("Q2 2021", PeriodKey::Quarter { year: 2021, quarter: 2 })]
    #[case("q2 2021", PeriodKey::Quarter { year: 2021, quarter: 2 })]
    #[case("2021Q4", PeriodKey::Quarter { year: 2021, quarter: 4 })]
    #[case("2021-Q1", PeriodKey::Quarter { year: 2021, quarter: 1 })]
    fn test_parse_period(#[case] text: &str, #[case] expected: PeriodKey) {
        assert_eq!(text.parse::<PeriodKey>().unwrap(), expected);
    }

    #[rstest]
    #[case("Q5 2021")]
    #[case("Q0 2021")]
    #[case("next year")]
    #[case("")]
    fn test_parse_period_rejects(#[case] text: &str) {
        assert!(matches!(
            text.parse::<PeriodKey>(),
            Err(MetricError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_quarter_ordering() {
        let q4 = PeriodKey::Quarter { year: 2022, quarter: 4 };
        let q1 = PeriodKey::Quarter { year: 2023, quarter: 1 };
        assert!(q4 < q1);
    }

    #[test]
    fn test_year_bounds_cover_whole_year_for_quarters() {
        let range = PeriodRange::between(Some(PeriodKey::Year(2022)), Some(PeriodKey::Year(2022)))
            .resolve(Granularity::Quarterly)
            .unwrap();

        assert!(range.contains(&PeriodKey::Quarter { year: 2022, quarter: 1 }));
        assert!(range.contains(&PeriodKey::Quarter { year: 2022, quarter: 4 }));
        assert!(!range.contains(&PeriodKey::Quarter { year: 2023, quarter: 1 }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let range = PeriodRange::between(Some(PeriodKey::Year(2023)), Some(PeriodKey::Year(2020)));
        assert!(matches!(
            range.resolve(Granularity::Annual),
            Err(MetricError::InvalidRange { .. })
        ));

        assert!(DateRange::between(Some(date(2024, 1, 2)), Some(date(2024, 1, 1))).is_err());
    }

    #[test]
    fn test_unbounded_range_contains_everything() {
        let range = PeriodRange::all();
        assert!(range.is_unbounded());
        assert!(range.contains(&PeriodKey::Year(1990)));
    }
}
