//! Record normalization.
//!
//! Turns the raw, index-keyed collections delivered by the store into
//! chronologically ordered [`PeriodSeries`] and [`DividendSeries`].

use crate::error::{DataError, Result};
use crate::fields::FinancialField;
use crate::records::{DividendRecord, DividendSeries, Granularity, PeriodRecord, PeriodSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Raw period entries keyed by their insertion-order index.
pub type RawTable = BTreeMap<usize, Map<String, Value>>;

/// Textual null markers written by the upstream loader.
const NULL_MARKERS: &[&str] = &["None", "null", "NaN", ""];

/// Key carrying the period close date.
const END_DATE_KEY: &str = "endDate";

/// Key carrying the payout date on dividend entries.
const DIVIDEND_DATE_KEY: &str = "index";

/// Key carrying the payout amount on dividend entries.
const DIVIDEND_AMOUNT_KEY: &str = "dividend";

/// Sentinel date value marking "no dividend history".
const EMPTY_DIVIDENDS_SENTINEL: &str = "empty";

/// Configuration for the record normalizer.
#[derive(Debug, Clone, Default)]
pub struct NormalizerConfig {
    /// Fail on keys outside the field schema instead of dropping them (default: false)
    pub strict_fields: bool,
}

/// Converts raw store collections into normalized series.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    config: NormalizerConfig,
}

impl RecordNormalizer {
    /// Create a normalizer with the given configuration.
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Create a normalizer that rejects unknown fields.
    pub const fn strict() -> Self {
        Self::new(NormalizerConfig {
            strict_fields: true,
        })
    }

    /// Normalize a raw period collection.
    ///
    /// Null markers coerce to zero. Output is sorted by `end_date` regardless of
    /// the input key order.
    pub fn normalize_periods(
        &self,
        ticker: &str,
        granularity: Granularity,
        raw: &RawTable,
    ) -> Result<PeriodSeries> {
        if raw.is_empty() {
            return Err(DataError::unavailable(
                ticker,
                format!("no {} periods in store", granularity.store_node()),
            ));
        }

        let mut records = Vec::with_capacity(raw.len());
        for (index, entry) in raw {
            records.push(self.normalize_period(ticker, *index, entry)?);
        }

        Ok(PeriodSeries::from_records(ticker, granularity, records))
    }

    fn normalize_period(
        &self,
        ticker: &str,
        index: usize,
        entry: &Map<String, Value>,
    ) -> Result<PeriodRecord> {
        let end_date = entry
            .get(END_DATE_KEY)
            .and_then(parse_date)
            .ok_or_else(|| {
                DataError::unavailable(ticker, format!("record {} has no parseable endDate", index))
            })?;

        let mut record = PeriodRecord::new(end_date);
        for (key, value) in entry {
            if FinancialField::is_metadata_key(key) {
                continue;
            }
            match FinancialField::from_store_name(key) {
                Some(field) => record.set(field, coerce_number(ticker, key, value)),
                None if self.config.strict_fields => {
                    return Err(DataError::UnknownField {
                        ticker: ticker.to_string(),
                        index,
                        field: key.clone(),
                    });
                }
                None => debug!(ticker, field = %key, "dropping field outside schema"),
            }
        }

        Ok(record)
    }

    /// Normalize a raw dividend collection.
    ///
    /// A first entry whose date is the `empty` sentinel yields an empty series.
    pub fn normalize_dividends(&self, ticker: &str, raw: &RawTable) -> Result<DividendSeries> {
        let Some(first) = raw.values().next() else {
            return Err(DataError::unavailable(ticker, "no dividend node in store"));
        };

        if first.get(DIVIDEND_DATE_KEY).and_then(Value::as_str) == Some(EMPTY_DIVIDENDS_SENTINEL) {
            return Ok(DividendSeries::empty(ticker));
        }

        let mut records = Vec::with_capacity(raw.len());
        for (index, entry) in raw {
            let date = entry
                .get(DIVIDEND_DATE_KEY)
                .and_then(parse_date)
                .ok_or_else(|| {
                    DataError::unavailable(
                        ticker,
                        format!("dividend record {} has no parseable date", index),
                    )
                })?;
            let amount = entry
                .get(DIVIDEND_AMOUNT_KEY)
                .map_or(0.0, |v| coerce_number(ticker, DIVIDEND_AMOUNT_KEY, v));
            records.push(DividendRecord { date, amount });
        }

        Ok(DividendSeries::from_records(ticker, records))
    }
}

/// Convert a store payload into a [`RawTable`].
///
/// The store returns either a JSON array or an object keyed by integer strings.
/// A `null` payload means the ticker is not present.
pub fn raw_table_from_value(ticker: &str, value: Value) -> Result<RawTable> {
    let mut table = RawTable::new();
    match value {
        Value::Null => {
            return Err(DataError::unavailable(ticker, "not in store"));
        }
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(map) => {
                        table.insert(index, map);
                    }
                    // Sparse arrays come back with null holes.
                    Value::Null => {}
                    other => {
                        return Err(DataError::unavailable(
                            ticker,
                            format!("entry {} is not an object: {}", index, other),
                        ));
                    }
                }
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let index: usize = key.parse().map_err(|_| {
                    DataError::unavailable(ticker, format!("non-ordinal key '{}'", key))
                })?;
                match item {
                    Value::Object(entry) => {
                        table.insert(index, entry);
                    }
                    Value::Null => {}
                    other => {
                        return Err(DataError::unavailable(
                            ticker,
                            format!("entry {} is not an object: {}", index, other),
                        ));
                    }
                }
            }
        }
        other => {
            return Err(DataError::unavailable(
                ticker,
                format!("unexpected payload: {}", other),
            ));
        }
    }
    Ok(table)
}

/// Read a numeric cell, coercing null markers to zero.
fn coerce_number(ticker: &str, key: &str, value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if NULL_MARKERS.contains(&s.trim()) => 0.0,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(ticker, field = key, value = %s, "non-numeric value read as zero");
                0.0
            }
        },
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            warn!(ticker, field = key, "non-scalar value read as zero");
            0.0
        }
    }
}

/// Parse a date cell to a timezone-naive calendar day.
///
/// Accepts ISO dates, RFC 3339 timestamps (the zone is dropped, keeping the
/// wall-clock day), naive timestamps and epoch milliseconds.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
