//! Fundamental metric catalog.
//!
//! Every metric is computed independently from the range-filtered period
//! window: a field missing for one period leaves only the metrics that read
//! it undefined for that period, and a field missing from the whole window
//! fails only the metrics that need it.

use crate::compare::Chart;
use crate::error::{MetricError, Result};
use crate::frame::{collect_values, values_frame};
use crate::period::{PeriodKey, PeriodRange, period_keys};
use crate::series::PeriodValues;
use crate::split::SplitAdjuster;
use polars::prelude::{col, lit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockdoc_data::{FinancialField, Granularity, PeriodRecord, PeriodSeries};
use tracing::{info, warn};

/// A derived fundamental series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundamentalMetric {
    /// Total revenue
    Revenue,
    /// Net income
    NetIncome,
    /// Period-over-period revenue change in percent
    RevenueGrowth,
    /// Split-adjusted shares outstanding
    Shares,
    /// Cash and short-term investments
    Cash,
    /// Non-current long-term debt, or total long-term debt when the former is never reported
    LongTermDebt,
    /// Capital expenditures
    Capex,
    /// Operating cash flow minus capital expenditures
    FreeCashFlow,
    /// Gross profit over revenue in percent
    GrossMargin,
    /// Net income over revenue in percent
    NetMargin,
    /// Operating income plus depreciation, depletion and amortization
    Ebitda,
    /// Operating income
    Ebit,
    /// Interest expense
    InterestExpense,
}

use FundamentalMetric::*;

const REVENUE: &str = "revenue";

impl FundamentalMetric {
    /// Every metric of the catalog.
    pub const ALL: &'static [Self] = &[
        Revenue,
        NetIncome,
        RevenueGrowth,
        Shares,
        Cash,
        LongTermDebt,
        Capex,
        FreeCashFlow,
        GrossMargin,
        NetMargin,
        Ebitda,
        Ebit,
        InterestExpense,
    ];

    /// Metrics charted in the multi-ticker fundamentals comparison.
    pub const COMPARISON: &'static [Self] = &[
        Revenue,
        NetIncome,
        FreeCashFlow,
        GrossMargin,
        NetMargin,
        RevenueGrowth,
        Cash,
        LongTermDebt,
        Capex,
        Ebitda,
        Ebit,
    ];

    /// Column header used in single-ticker charts.
    pub const fn label(&self) -> &'static str {
        match self {
            Revenue => "Revenue",
            NetIncome => "Income",
            RevenueGrowth => "Growth %",
            Shares => "Shares",
            Cash => "Cash",
            LongTermDebt => "Debt",
            Capex => "CAPEX",
            FreeCashFlow => "FCF",
            GrossMargin => "Gross Margin",
            NetMargin => "Net Margin",
            Ebitda => "EBITDA",
            Ebit => "EBIT",
            InterestExpense => "Interest",
        }
    }

    /// Chart title used when comparing tickers.
    pub const fn title(&self) -> &'static str {
        match self {
            Revenue => "Revenue",
            NetIncome => "Net Income",
            RevenueGrowth => "Revenue Growth %",
            Shares => "Shares Outstanding",
            Cash => "Cash",
            LongTermDebt => "Long Debt",
            Capex => "CAPEX",
            FreeCashFlow => "FCF",
            GrossMargin => "Gross Margins %",
            NetMargin => "Net Margins %",
            Ebitda => "EBITDA",
            Ebit => "EBIT",
            InterestExpense => "Interest Expense",
        }
    }

    /// Short identifier.
    pub const fn code(&self) -> &'static str {
        match self {
            Revenue => "revenue",
            NetIncome => "net_income",
            RevenueGrowth => "revenue_growth",
            Shares => "shares",
            Cash => "cash",
            LongTermDebt => "long_term_debt",
            Capex => "capex",
            FreeCashFlow => "free_cash_flow",
            GrossMargin => "gross_margin",
            NetMargin => "net_margin",
            Ebitda => "ebitda",
            Ebit => "ebit",
            InterestExpense => "interest_expense",
        }
    }

    /// Store fields the metric reads.
    pub const fn required_fields(&self) -> &'static [FinancialField] {
        use FinancialField as F;
        match self {
            Revenue | RevenueGrowth => &[F::TotalRevenue],
            NetIncome => &[F::NetIncome],
            Shares => &[F::CommonStockSharesOutstanding],
            Cash => &[F::CashAndShortTermInvestments],
            LongTermDebt => &[F::LongTermDebtNoncurrent, F::LongTermDebt],
            Capex => &[F::CapitalExpenditures],
            FreeCashFlow => &[F::OperatingCashflow, F::CapitalExpenditures],
            GrossMargin => &[F::GrossProfit, F::TotalRevenue],
            NetMargin => &[F::NetIncome, F::TotalRevenue],
            Ebitda => &[F::OperatingIncome, F::DepreciationDepletionAndAmortization],
            Ebit => &[F::OperatingIncome],
            InterestExpense => &[F::InterestExpense],
        }
    }
}

impl fmt::Display for FundamentalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for FundamentalMetric {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|m| {
                m.code().eq_ignore_ascii_case(wanted)
                    || m.label().eq_ignore_ascii_case(wanted)
                    || m.title().eq_ignore_ascii_case(wanted)
            })
            .copied()
            .ok_or_else(|| MetricError::UnknownMetric(s.to_string()))
    }
}

/// Chart groups of the single-ticker fundamentals view, in display order.
pub const FUNDAMENTALS_CHARTS: &[(&str, &[FundamentalMetric])] = &[
    ("Revenue and Net Income", &[Revenue, NetIncome]),
    ("Revenue growth %", &[RevenueGrowth]),
    ("Shares Outstanding", &[Shares]),
    ("Gross and Net Margin %", &[GrossMargin, NetMargin]),
    (
        "EBITDA, EBIT, FCF vs Interest Expense",
        &[Ebitda, Ebit, FreeCashFlow, InterestExpense],
    ),
    ("Cash vs Long Debt", &[Cash, LongTermDebt]),
    ("CAPEX", &[Capex]),
];

/// Computes catalog metrics for one ticker over a window of periods.
#[derive(Debug, Clone)]
pub struct MetricDeriver<'a> {
    series: &'a PeriodSeries,
    range: PeriodRange,
    splits: SplitAdjuster,
}

impl<'a> MetricDeriver<'a> {
    /// Deriver over every period of `series`.
    pub fn new(series: &'a PeriodSeries) -> Self {
        Self {
            series,
            range: PeriodRange::all(),
            splits: SplitAdjuster::default(),
        }
    }

    /// Builder: restrict to `range`, checked against the series granularity.
    pub fn with_range(mut self, range: PeriodRange) -> Result<Self> {
        self.range = range.resolve(self.series.granularity())?;
        Ok(self)
    }

    /// Builder: override split detection.
    pub const fn with_split_adjuster(mut self, splits: SplitAdjuster) -> Self {
        self.splits = splits;
        self
    }

    /// Ticker of the underlying series.
    pub fn ticker(&self) -> &str {
        self.series.ticker()
    }

    /// Granularity of the underlying series.
    pub const fn granularity(&self) -> Granularity {
        self.series.granularity()
    }

    /// Labelled periods inside the range, in order.
    pub fn window(&self) -> Result<Vec<(PeriodKey, &'a PeriodRecord)>> {
        let window: Vec<_> = period_keys(self.series)
            .into_iter()
            .zip(self.series.records())
            .filter(|(key, _)| self.range.contains(key))
            .collect();

        if window.is_empty() {
            return Err(MetricError::EmptySeries {
                ticker: self.ticker().to_string(),
            });
        }
        Ok(window)
    }

    /// Compute one metric.
    pub fn derive(&self, metric: FundamentalMetric) -> Result<PeriodValues> {
        use FinancialField as F;
        match metric {
            Revenue => self.passthrough(metric, F::TotalRevenue),
            NetIncome => self.passthrough(metric, F::NetIncome),
            RevenueGrowth => self.revenue_growth(),
            Shares => self.shares(),
            Cash => self.passthrough(metric, F::CashAndShortTermInvestments),
            LongTermDebt => self.long_term_debt(),
            Capex => self.passthrough(metric, F::CapitalExpenditures),
            FreeCashFlow => {
                self.combine(metric, [F::OperatingCashflow, F::CapitalExpenditures], |[ocf, capex]| {
                    ocf - capex
                })
            }
            GrossMargin => self.combine(metric, [F::GrossProfit, F::TotalRevenue], |[gross, rev]| {
                gross / rev * 100.0
            }),
            NetMargin => self.combine(metric, [F::NetIncome, F::TotalRevenue], |[net, rev]| {
                net / rev * 100.0
            }),
            Ebitda => self.combine(
                metric,
                [F::OperatingIncome, F::DepreciationDepletionAndAmortization],
                |[operating, da]| operating + da,
            ),
            Ebit => self.passthrough(metric, F::OperatingIncome),
            InterestExpense => self.passthrough(metric, F::InterestExpense),
        }
    }

    /// One chart: a column per metric, metrics that cannot be computed are
    /// reported alongside.
    pub fn chart(&self, title: &str, metrics: &[FundamentalMetric]) -> Result<Chart<PeriodKey>> {
        let mut columns = Vec::with_capacity(metrics.len());
        let mut unavailable = Vec::new();
        for metric in metrics {
            match self.derive(*metric) {
                Ok(series) => columns.push(series),
                Err(e) => {
                    warn!(ticker = self.ticker(), metric = metric.code(), error = %e, "metric skipped");
                    unavailable.push(e);
                }
            }
        }
        Chart::new(title, columns, unavailable)
    }

    /// Every chart of the single-ticker fundamentals view.
    pub fn fundamentals_charts(&self) -> Result<Vec<Chart<PeriodKey>>> {
        FUNDAMENTALS_CHARTS
            .iter()
            .map(|(title, metrics)| self.chart(title, metrics))
            .collect()
    }

    fn require(
        &self,
        metric: FundamentalMetric,
        window: &[(PeriodKey, &PeriodRecord)],
        field: FinancialField,
    ) -> Result<()> {
        if window.iter().any(|(_, r)| r.has(field)) {
            Ok(())
        } else {
            Err(MetricError::unavailable(self.ticker(), metric.label(), field))
        }
    }

    fn passthrough(&self, metric: FundamentalMetric, field: FinancialField) -> Result<PeriodValues> {
        self.combine(metric, [field], |[value]| value)
    }

    fn combine<const N: usize, F>(
        &self,
        metric: FundamentalMetric,
        fields: [FinancialField; N],
        compute: F,
    ) -> Result<PeriodValues>
    where
        F: Fn([f64; N]) -> f64,
    {
        let window = self.window()?;
        for field in fields {
            self.require(metric, &window, field)?;
        }

        let mut out = PeriodValues::new(metric.label());
        for (key, record) in &window {
            let mut values = [0.0; N];
            let mut defined = true;
            for (slot, field) in values.iter_mut().zip(fields) {
                match record.value(field) {
                    Some(v) => *slot = v,
                    None => defined = false,
                }
            }
            if defined {
                out.insert(*key, compute(values));
            }
        }
        Ok(out)
    }

    fn revenue_growth(&self) -> Result<PeriodValues> {
        let window = self.window()?;
        self.require(RevenueGrowth, &window, FinancialField::TotalRevenue)?;

        let revenue: Vec<Option<f64>> = window
            .iter()
            .map(|(_, r)| r.value(FinancialField::TotalRevenue))
            .collect();
        let previous = col(REVENUE).shift(lit(1));
        let frame = values_frame(REVENUE, revenue)?
            .select([((col(REVENUE) - previous.clone()) / previous * lit(100.0)).alias(REVENUE)]);

        let growth = collect_values(frame, REVENUE)?;
        Ok(PeriodValues::from_points(
            RevenueGrowth.label(),
            window
                .iter()
                .zip(growth)
                .filter_map(|((key, _), pct)| pct.map(|pct| (*key, pct))),
        ))
    }

    fn long_term_debt(&self) -> Result<PeriodValues> {
        let window = self.window()?;
        let primary = FinancialField::LongTermDebtNoncurrent;
        let never_reported = window
            .iter()
            .all(|(_, r)| r.value(primary).is_none_or(|v| v == 0.0));

        if never_reported {
            info!(
                ticker = self.ticker(),
                "longTermDebtNoncurrent is zero across the window, using longTermDebt"
            );
            self.passthrough(LongTermDebt, FinancialField::LongTermDebt)
        } else {
            self.passthrough(LongTermDebt, primary)
        }
    }

    fn shares(&self) -> Result<PeriodValues> {
        // Splits are detected over the full history, then windowed.
        let adjusted = self.splits.adjusted_shares(self.series)?;
        let window = self.window()?;

        let mut out = PeriodValues::new(Shares.label());
        for (date, count) in adjusted {
            if let Some((key, _)) = window.iter().find(|(_, r)| r.end_date == date) {
                out.insert(*key, count);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn annual(records: Vec<PeriodRecord>) -> PeriodSeries {
        PeriodSeries::from_records("ACME", Granularity::Annual, records)
    }

    fn year(y: i32) -> PeriodRecord {
        PeriodRecord::new(date(y, 12, 31))
    }

    fn sample() -> PeriodSeries {
        use FinancialField as F;
        annual(vec![
            year(2021)
                .with_value(F::TotalRevenue, 100.0)
                .with_value(F::NetIncome, 10.0)
                .with_value(F::GrossProfit, 40.0)
                .with_value(F::OperatingCashflow, 30.0)
                .with_value(F::CapitalExpenditures, 12.0)
                .with_value(F::OperatingIncome, 20.0)
                .with_value(F::DepreciationDepletionAndAmortization, 5.0)
                .with_value(F::LongTermDebtNoncurrent, 0.0)
                .with_value(F::LongTermDebt, 70.0),
            year(2022)
                .with_value(F::TotalRevenue, 125.0)
                .with_value(F::NetIncome, 15.0)
                .with_value(F::OperatingCashflow, 35.0)
                .with_value(F::CapitalExpenditures, 10.0)
                .with_value(F::OperatingIncome, 25.0)
                .with_value(F::DepreciationDepletionAndAmortization, 5.0)
                .with_value(F::LongTermDebtNoncurrent, 0.0)
                .with_value(F::LongTermDebt, 60.0),
            year(2023)
                .with_value(F::TotalRevenue, 150.0)
                .with_value(F::NetIncome, 30.0)
                .with_value(F::GrossProfit, 75.0)
                .with_value(F::OperatingCashflow, 50.0)
                .with_value(F::CapitalExpenditures, 20.0)
                .with_value(F::OperatingIncome, 40.0)
                .with_value(F::DepreciationDepletionAndAmortization, 10.0)
                .with_value(F::LongTermDebtNoncurrent, 0.0)
                .with_value(F::LongTermDebt, 50.0),
        ])
    }

    #[test]
    fn test_margin_independence() {
        let series = sample();
        let deriver = MetricDeriver::new(&series);

        let gross = deriver.derive(GrossMargin).unwrap();
        assert_eq!(gross.get(&PeriodKey::Year(2022)), None);
        assert_relative_eq!(gross.get(&PeriodKey::Year(2021)).unwrap(), 40.0);

        let net = deriver.derive(NetMargin).unwrap();
        assert_relative_eq!(net.get(&PeriodKey::Year(2022)).unwrap(), 12.0);
        assert_eq!(
            deriver.derive(Revenue).unwrap().get(&PeriodKey::Year(2022)),
            Some(125.0)
        );
        assert_eq!(
            deriver.derive(NetIncome).unwrap().get(&PeriodKey::Year(2022)),
            Some(15.0)
        );
    }

    #[test]
    fn test_free_cash_flow_and_ebitda() {
        let series = sample();
        let deriver = MetricDeriver::new(&series);

        let fcf = deriver.derive(FreeCashFlow).unwrap();
        assert_eq!(fcf.values(), vec![18.0, 25.0, 30.0]);

        let ebitda = deriver.derive(Ebitda).unwrap();
        assert_eq!(ebitda.values(), vec![25.0, 30.0, 50.0]);
        assert_eq!(deriver.derive(Ebit).unwrap().values(), vec![20.0, 25.0, 40.0]);
    }

    #[test]
    fn test_revenue_growth() {
        let series = sample();
        let growth = MetricDeriver::new(&series).derive(RevenueGrowth).unwrap();

        assert_eq!(growth.get(&PeriodKey::Year(2021)), None);
        assert_relative_eq!(growth.get(&PeriodKey::Year(2022)).unwrap(), 25.0);
        assert_relative_eq!(growth.get(&PeriodKey::Year(2023)).unwrap(), 20.0);
    }

    #[test]
    fn test_growth_starts_at_window_start() {
        let series = sample();
        let deriver = MetricDeriver::new(&series)
            .with_range(PeriodRange::between(Some(PeriodKey::Year(2022)), None))
            .unwrap();
        let growth = deriver.derive(RevenueGrowth).unwrap();
        assert_eq!(growth.keys().collect::<Vec<_>>(), vec![PeriodKey::Year(2023)]);
    }

    #[test]
    fn test_debt_substitution() {
        let series = sample();
        let debt = MetricDeriver::new(&series).derive(LongTermDebt).unwrap();
        assert_eq!(debt.values(), vec![70.0, 60.0, 50.0]);
    }

    #[test]
    fn test_debt_substitution_is_window_scoped() {
        use FinancialField as F;
        let series = annual(vec![
            year(2021)
                .with_value(F::LongTermDebtNoncurrent, 80.0)
                .with_value(F::LongTermDebt, 90.0),
            year(2022)
                .with_value(F::LongTermDebtNoncurrent, 0.0)
                .with_value(F::LongTermDebt, 60.0),
        ]);

        let full = MetricDeriver::new(&series).derive(LongTermDebt).unwrap();
        assert_eq!(full.values(), vec![80.0, 0.0]);

        let last = MetricDeriver::new(&series)
            .with_range(PeriodRange::between(Some(PeriodKey::Year(2022)), None))
            .unwrap()
            .derive(LongTermDebt)
            .unwrap();
        assert_eq!(last.values(), vec![60.0]);
    }

    #[test]
    fn test_missing_field_fails_only_its_metric() {
        let series = sample();
        let deriver = MetricDeriver::new(&series);

        let err = deriver.derive(InterestExpense).unwrap_err();
        assert!(matches!(
            err,
            MetricError::DataUnavailable { field: FinancialField::InterestExpense, .. }
        ));

        let chart = deriver.chart("EBITDA, EBIT, FCF vs Interest Expense", &[
            Ebitda,
            Ebit,
            FreeCashFlow,
            InterestExpense,
        ])
        .unwrap();
        assert_eq!(chart.table.columns(), &["EBITDA", "EBIT", "FCF"]);
        assert_eq!(chart.unavailable.len(), 1);
    }

    #[test]
    fn test_empty_window() {
        let series = sample();
        let deriver = MetricDeriver::new(&series)
            .with_range(PeriodRange::between(Some(PeriodKey::Year(2030)), None))
            .unwrap();
        assert!(matches!(
            deriver.derive(Revenue),
            Err(MetricError::EmptySeries { .. })
        ));
    }

    #[test]
    fn test_quarterly_labels_follow_window() {
        use FinancialField as F;
        let series = PeriodSeries::from_records(
            "ACME",
            Granularity::Quarterly,
            vec![
                PeriodRecord::new(date(2023, 3, 31)).with_value(F::TotalRevenue, 1.0),
                PeriodRecord::new(date(2023, 6, 30)).with_value(F::TotalRevenue, 2.0),
                PeriodRecord::new(date(2023, 9, 30)).with_value(F::TotalRevenue, 3.0),
            ],
        );
        let from = "Q2 2023".parse().unwrap();
        let revenue = MetricDeriver::new(&series)
            .with_range(PeriodRange::between(Some(from), None))
            .unwrap()
            .derive(Revenue)
            .unwrap();

        let labels: Vec<String> = revenue.keys().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["Q2 2023", "Q3 2023"]);
    }

    fn quarters_closing(revenue: &[(NaiveDate, f64)]) -> PeriodSeries {
        PeriodSeries::from_records(
            "ACME",
            Granularity::Quarterly,
            revenue
                .iter()
                .map(|(end, value)| {
                    PeriodRecord::new(*end).with_value(FinancialField::TotalRevenue, *value)
                })
                .collect(),
        )
    }

    #[test]
    fn test_52_week_quarters_keep_every_period() {
        let series = quarters_closing(&[
            (date(2023, 4, 1), 100.0),
            (date(2023, 7, 1), 110.0),
            (date(2023, 9, 30), 120.0),
        ]);
        let deriver = MetricDeriver::new(&series);

        let revenue = deriver.derive(Revenue).unwrap();
        let labels: Vec<String> = revenue.keys().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["Q1 2023", "Q2 2023", "Q3 2023"]);
        assert_eq!(revenue.values(), vec![100.0, 110.0, 120.0]);

        // Growth is measured between the displayed points
        let growth = deriver.derive(RevenueGrowth).unwrap();
        assert_eq!(growth.len(), 2);
        assert_relative_eq!(growth.values()[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(growth.values()[1], 100.0 / 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_quarter_closes_get_distinct_labels() {
        let series = quarters_closing(&[
            (date(2023, 6, 30), 100.0),
            (date(2023, 8, 15), 50.0),
            (date(2023, 9, 30), 110.0),
        ]);
        let revenue = MetricDeriver::new(&series).derive(Revenue).unwrap();
        assert_eq!(revenue.len(), series.len());
        assert_eq!(revenue.values(), vec![100.0, 50.0, 110.0]);
    }

    #[test]
    fn test_growth_skips_unreported_and_zero_revenue() {
        let series = PeriodSeries::from_records(
            "ACME",
            Granularity::Annual,
            vec![
                year(2020).with_value(FinancialField::TotalRevenue, 0.0),
                year(2021).with_value(FinancialField::TotalRevenue, 50.0),
                year(2022),
                year(2023).with_value(FinancialField::TotalRevenue, 80.0),
            ],
        );
        let growth = MetricDeriver::new(&series).derive(RevenueGrowth).unwrap();
        assert!(growth.is_empty());
    }

    #[test]
    fn test_shares_split_adjusted_then_windowed() {
        use FinancialField as F;
        let series = PeriodSeries::from_records(
            "ACME",
            Granularity::Quarterly,
            [100.0, 100.0, 50.0, 50.0, 50.0]
                .iter()
                .zip([
                    date(2023, 3, 31),
                    date(2023, 6, 30),
                    date(2023, 9, 30),
                    date(2023, 12, 31),
                    date(2024, 3, 31),
                ])
                .map(|(count, end)| {
                    PeriodRecord::new(end).with_value(F::CommonStockSharesOutstanding, *count)
                })
                .collect(),
        );

        let shares = MetricDeriver::new(&series)
            .with_range(PeriodRange::between(None, Some(PeriodKey::Year(2023))))
            .unwrap()
            .derive(Shares)
            .unwrap();
        assert_eq!(shares.values(), vec![200.0, 200.0, 50.0, 50.0]);
    }

    #[test]
    fn test_fundamentals_charts_cover_catalog() {
        let series = sample();
        let charts = MetricDeriver::new(&series).fundamentals_charts().unwrap();
        assert_eq!(charts.len(), FUNDAMENTALS_CHARTS.len());
        assert_eq!(charts[0].title, "Revenue and Net Income");
        assert_eq!(charts[0].table.columns(), &["Revenue", "Income"]);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("fcf".parse::<FundamentalMetric>().unwrap(), FreeCashFlow);
        assert_eq!("gross_margin".parse::<FundamentalMetric>().unwrap(), GrossMargin);
        assert_eq!("Net Income".parse::<FundamentalMetric>().unwrap(), NetIncome);
        assert!("alpha".parse::<FundamentalMetric>().is_err());
    }
}
