//! Dividend aggregation.

use crate::period::PeriodKey;
use crate::series::PeriodValues;
use std::collections::BTreeMap;
use stockdoc_data::{DividendSeries, Granularity};

/// Title of the dividend chart.
pub const DIVIDEND_CHART: &str = "Dividends per Share";

/// Banner shown in place of the dividend chart.
pub const NO_DIVIDENDS: &str = "Company pays no dividends";

/// What the dividend panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DividendView {
    /// The company has no dividend history
    NoDividends,
    /// Payouts summed per period
    Paid(PeriodValues),
}

impl DividendView {
    /// Group payouts by calendar quarter or calendar year and sum each group.
    ///
    /// An empty history never reaches the aggregation.
    pub fn aggregate(dividends: &DividendSeries, granularity: Granularity) -> Self {
        if dividends.is_empty() {
            return Self::NoDividends;
        }

        let mut totals: BTreeMap<PeriodKey, f64> = BTreeMap::new();
        for record in dividends.records() {
            *totals
                .entry(PeriodKey::for_date(record.date, granularity))
                .or_insert(0.0) += record.amount;
        }
        Self::Paid(PeriodValues::from_points("Dividend", totals))
    }

    /// Whether the company pays dividends.
    pub const fn pays_dividends(&self) -> bool {
        matches!(self, Self::Paid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use stockdoc_data::DividendRecord;

    fn payout(y: i32, m: u32, d: u32, amount: f64) -> DividendRecord {
        DividendRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount,
        }
    }

    fn history() -> DividendSeries {
        DividendSeries::from_records(
            "ACME",
            vec![
                payout(2022, 11, 10, 0.23),
                payout(2023, 2, 10, 0.23),
                payout(2023, 5, 12, 0.24),
                payout(2023, 8, 11, 0.24),
                payout(2023, 11, 10, 0.24),
            ],
        )
    }

    #[test]
    fn test_empty_history_routes_to_banner() {
        let view = DividendView::aggregate(&DividendSeries::empty("ACME"), Granularity::Annual);
        assert_eq!(view, DividendView::NoDividends);
        assert!(!view.pays_dividends());
    }

    #[test]
    fn test_annual_sums_per_calendar_year() {
        let DividendView::Paid(totals) = DividendView::aggregate(&history(), Granularity::Annual)
        else {
            panic!("expected payouts");
        };
        assert_relative_eq!(totals.get(&PeriodKey::Year(2022)).unwrap(), 0.23);
        assert_relative_eq!(totals.get(&PeriodKey::Year(2023)).unwrap(), 0.95, epsilon = 1e-12);
    }

    #[test]
    fn test_several_payouts_in_one_quarter_are_summed() {
        let history = DividendSeries::from_records(
            "ACME",
            vec![
                payout(2023, 1, 10, 0.25),
                payout(2023, 2, 10, 0.25),
                payout(2023, 3, 10, 1.0),
                payout(2023, 4, 10, 0.25),
            ],
        );
        let DividendView::Paid(totals) = DividendView::aggregate(&history, Granularity::Quarterly)
        else {
            panic!("expected payouts");
        };
        assert_eq!(totals.len(), 2);
        assert_relative_eq!(
            totals.get(&PeriodKey::Quarter { year: 2023, quarter: 1 }).unwrap(),
            1.5
        );
        assert_relative_eq!(
            totals.get(&PeriodKey::Quarter { year: 2023, quarter: 2 }).unwrap(),
            0.25
        );
    }

    #[test]
    fn test_quarterly_one_point_per_quarter() {
        let DividendView::Paid(totals) =
            DividendView::aggregate(&history(), Granularity::Quarterly)
        else {
            panic!("expected payouts");
        };
        let labels: Vec<String> = totals.keys().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["Q4 2022", "Q1 2023", "Q2 2023", "Q3 2023", "Q4 2023"]);
    }
}
