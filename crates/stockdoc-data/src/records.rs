//! Normalized record types shared by the whole pipeline.

use crate::error::{DataError, Result};
use crate::fields::FinancialField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Reporting granularity of a period series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// Annual report (10-K)
    Annual,
    /// Quarterly report (10-Q)
    Quarterly,
}

impl Granularity {
    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::Quarterly => "Q",
            Self::Annual => "A",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "Q" => Ok(Self::Quarterly),
            "A" => Ok(Self::Annual),
            _ => Err(DataError::Parse(format!("Invalid granularity: {}", s))),
        }
    }

    /// Top-level node holding this granularity in the remote store.
    pub const fn store_node(&self) -> &'static str {
        match self {
            Self::Annual => "year",
            Self::Quarterly => "quarter",
        }
    }
}

/// One reporting period for one ticker.
///
/// A field that was present with a null marker holds `0.0`; a field the store
/// never delivered for this period is absent and reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Period close date
    pub end_date: NaiveDate,
    values: BTreeMap<FinancialField, f64>,
}

impl PeriodRecord {
    /// Create an empty record closing on `end_date`.
    pub const fn new(end_date: NaiveDate) -> Self {
        Self {
            end_date,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter.
    pub fn with_value(mut self, field: FinancialField, value: f64) -> Self {
        self.values.insert(field, value);
        self
    }

    /// Set a field value.
    pub fn set(&mut self, field: FinancialField, value: f64) {
        self.values.insert(field, value);
    }

    /// Value of `field`, `None` when the store did not deliver it.
    pub fn value(&self, field: FinancialField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Value of `field` with absence read as zero.
    pub fn value_or_zero(&self, field: FinancialField) -> f64 {
        self.value(field).unwrap_or(0.0)
    }

    /// Whether the record carries `field` at all.
    pub fn has(&self, field: FinancialField) -> bool {
        self.values.contains_key(&field)
    }

    /// Iterate over the fields present on this record.
    pub fn fields(&self) -> impl Iterator<Item = (FinancialField, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

/// Chronologically ordered period records for one ticker and granularity.
///
/// Invariant: `end_date` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSeries {
    ticker: String,
    granularity: Granularity,
    records: Vec<PeriodRecord>,
}

impl PeriodSeries {
    /// Build a series from records in arbitrary order.
    ///
    /// Records are sorted by `end_date`. When two records share a date the one
    /// given later wins.
    pub fn from_records(
        ticker: impl Into<String>,
        granularity: Granularity,
        records: Vec<PeriodRecord>,
    ) -> Self {
        let ticker = ticker.into();
        let mut by_date: BTreeMap<NaiveDate, PeriodRecord> = BTreeMap::new();
        for record in records {
            if let Some(previous) = by_date.insert(record.end_date, record) {
                debug!(
                    ticker = %ticker,
                    end_date = %previous.end_date,
                    "duplicate period replaced by later record"
                );
            }
        }

        Self {
            ticker,
            granularity,
            records: by_date.into_values().collect(),
        }
    }

    /// Ticker this series belongs to.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Granularity of the series.
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Records in ascending `end_date` order.
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    /// Number of periods.
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the series has no periods.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Period close dates in order.
    pub fn end_dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.end_date).collect()
    }

    /// One field across all periods, `None` where the field is absent.
    pub fn column(&self, field: FinancialField) -> Vec<(NaiveDate, Option<f64>)> {
        self.records
            .iter()
            .map(|r| (r.end_date, r.value(field)))
            .collect()
    }

    /// Whether no period carries `field`.
    pub fn lacks(&self, field: FinancialField) -> bool {
        !self.records.iter().any(|r| r.has(field))
    }

    /// Sub-series of the records matching `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&PeriodRecord) -> bool,
    {
        Self {
            ticker: self.ticker.clone(),
            granularity: self.granularity,
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

/// A single dividend payout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    /// Payout date
    pub date: NaiveDate,
    /// Amount per share
    pub amount: f64,
}

/// Dividend history for one ticker. Empty means the company pays no dividends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendSeries {
    ticker: String,
    records: Vec<DividendRecord>,
}

impl DividendSeries {
    /// Series with no payouts.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            records: Vec::new(),
        }
    }

    /// Build from payouts in arbitrary order; result is sorted by date.
    pub fn from_records(ticker: impl Into<String>, mut records: Vec<DividendRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            ticker: ticker.into(),
            records,
        }
    }

    /// Ticker this series belongs to.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Payouts in ascending date order.
    pub fn records(&self) -> &[DividendRecord] {
        &self.records
    }

    /// Whether the company pays no dividends.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the most recent `n` payouts, `None` when there are none.
    pub fn trailing_sum(&self, n: usize) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let start = self.records.len().saturating_sub(n);
        Some(self.records[start..].iter().map(|r| r.amount).sum())
    }
}

/// Daily adjusted-close prices for one ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    /// Build from `(date, adjusted close)` pairs.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Price on `date`, if the market printed one.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Most recent close.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points.iter().next_back().map(|(d, p)| (*d, *p))
    }

    /// Second most recent close.
    pub fn previous_close(&self) -> Option<f64> {
        self.points.values().rev().nth(1).copied()
    }

    /// Iterate in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, p)| (*d, *p))
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no prices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Vendor valuation figures shown next to the derived statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSnapshot {
    /// Market capitalization as reported by the vendor
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Forward P/E
    #[serde(default, rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    /// PEG ratio
    #[serde(default)]
    pub peg_ratio: Option<f64>,
}

/// Everything the fundamentals fetch yields for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerFundamentals {
    /// Ticker in store form
    pub ticker: String,
    /// Annual periods
    pub annual: PeriodSeries,
    /// Quarterly periods
    pub quarterly: PeriodSeries,
    /// Vendor valuation snapshot
    pub snapshot: ValuationSnapshot,
}

impl TickerFundamentals {
    /// Series for the requested granularity.
    pub const fn series(&self, granularity: Granularity) -> &PeriodSeries {
        match granularity {
            Granularity::Annual => &self.annual,
            Granularity::Quarterly => &self.quarterly,
        }
    }
}
