//! Aligned tables and multi-ticker comparison.

use crate::derive::{FundamentalMetric, MetricDeriver};
use crate::error::{MetricError, Result};
use crate::frame::{FrameKey, KEY, keyed_frame};
use crate::period::{PeriodKey, PeriodRange};
use crate::series::DerivedSeries;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use stockdoc_data::PeriodSeries;
use tracing::{debug, warn};

/// Series outer-joined on their keys.
///
/// A row exists for every key defined in at least one column; cells a column
/// does not define are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<K: Ord> {
    columns: Vec<String>,
    rows: BTreeMap<K, Vec<Option<f64>>>,
}

impl<K: FrameKey> Table<K> {
    /// Outer join of `series`, one column per series in the given order.
    ///
    /// The join runs in polars on the encoded keys; rows come back sorted.
    pub fn align<I>(series: I) -> Result<Self>
    where
        I: IntoIterator<Item = DerivedSeries<K>>,
    {
        let series: Vec<DerivedSeries<K>> = series.into_iter().collect();
        let columns: Vec<String> = series.iter().map(|s| s.name().to_string()).collect();
        // Positional names: headers may repeat
        let slots: Vec<String> = (0..series.len()).map(|i| format!("c{i}")).collect();

        let mut frames = series
            .iter()
            .zip(&slots)
            .map(|(s, slot)| keyed_frame(slot, s));
        let Some(first) = frames.next() else {
            return Ok(Self {
                columns,
                rows: BTreeMap::new(),
            });
        };

        let mut joined = first?;
        for frame in frames {
            joined = joined.join(
                frame?,
                [col(KEY)],
                [col(KEY)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            );
        }
        let df = joined.sort([KEY], Default::default()).collect()?;

        let keys = df.column(KEY)?.i64()?;
        let cells = slots
            .iter()
            .map(|slot| df.column(slot)?.f64())
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut rows = BTreeMap::new();
        for (row, code) in keys.into_iter().enumerate() {
            if let Some(key) = code.and_then(K::decode) {
                rows.insert(key, cells.iter().map(|c| c.get(row)).collect());
            }
        }
        Ok(Self { columns, rows })
    }
}

impl<K: Ord + Copy + Debug> Table<K> {
    /// Column headers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in key order.
    pub fn rows(&self) -> impl Iterator<Item = (K, &[Option<f64>])> + '_ {
        self.rows.iter().map(|(k, cells)| (*k, cells.as_slice()))
    }

    /// Row keys in order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.rows.keys().copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `key` in column `column`.
    pub fn get(&self, key: &K, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(key).and_then(|cells| cells[col])
    }

    /// One column back as a series.
    pub fn column(&self, name: &str) -> Option<DerivedSeries<K>> {
        let col = self.column_index(name)?;
        Some(DerivedSeries::from_points(
            name,
            self.rows
                .iter()
                .filter_map(|(k, cells)| cells[col].map(|v| (*k, v))),
        ))
    }

    /// Rows whose key satisfies `keep`.
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&K) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, cells)| (*k, cells.clone()))
                .collect(),
        }
    }

    /// Latest defined value of each column with its key.
    pub fn latest_values(&self) -> Vec<(String, Option<(K, f64)>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let latest = self
                    .rows
                    .iter()
                    .rev()
                    .find_map(|(k, cells)| cells[col].map(|v| (*k, v)));
                (name.clone(), latest)
            })
            .collect()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

impl<K: Ord + Copy + Debug + Display> Table<K> {
    /// Convert to a DataFrame with a leading `key_column` of row labels.
    pub fn to_dataframe(&self, key_column: &str) -> PolarsResult<DataFrame> {
        let labels: Vec<String> = self.rows.keys().map(|k| k.to_string()).collect();
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Series::new(key_column.into(), labels).into());

        for (col, name) in self.columns.iter().enumerate() {
            let values: Vec<Option<f64>> = self.rows.values().map(|cells| cells[col]).collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }

        DataFrame::new(columns)
    }
}

/// A titled table plus the metrics that could not be drawn in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart<K: Ord> {
    /// Chart title
    pub title: String,
    /// Aligned columns
    pub table: Table<K>,
    /// Per-column failures; the remaining columns are unaffected
    pub unavailable: Vec<MetricError>,
}

impl<K: FrameKey> Chart<K> {
    /// Chart over `columns`.
    pub fn new(
        title: impl Into<String>,
        columns: Vec<DerivedSeries<K>>,
        unavailable: Vec<MetricError>,
    ) -> Result<Self> {
        Ok(Self {
            title: title.into(),
            table: Table::align(columns)?,
            unavailable,
        })
    }
}

impl<K: Ord + Copy + Debug> Chart<K> {

    /// Whether nothing could be drawn.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// One chart per comparison metric, a column per ticker.
///
/// With an unbounded `range` the window spans the first ticker's periods and
/// applies to every ticker. A ticker missing a metric's inputs contributes no
/// column to that chart only.
pub fn compare_fundamentals(
    series: &[&PeriodSeries],
    range: &PeriodRange,
) -> Result<Vec<Chart<PeriodKey>>> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    let range = if range.is_unbounded() {
        PeriodRange::spanning(first)
    } else {
        *range
    };
    debug!(tickers = series.len(), ?range, "comparing fundamentals");

    let derivers = series
        .iter()
        .map(|s| MetricDeriver::new(s).with_range(range))
        .collect::<Result<Vec<_>>>()?;

    FundamentalMetric::COMPARISON
        .iter()
        .map(|metric| {
            let mut columns = Vec::with_capacity(derivers.len());
            let mut unavailable = Vec::new();
            for deriver in &derivers {
                match deriver.derive(*metric) {
                    Ok(values) => columns.push(values.renamed(deriver.ticker())),
                    Err(e) => {
                        warn!(ticker = deriver.ticker(), metric = metric.code(), error = %e, "no column");
                        unavailable.push(e);
                    }
                }
            }
            Chart::new(metric.title(), columns, unavailable)
        })
        .collect()
}
