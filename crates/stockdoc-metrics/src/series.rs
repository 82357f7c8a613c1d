//! Derived series containers.

use crate::period::PeriodKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

/// Named, key-ordered numeric series.
///
/// Only finite values are stored: an undefined point (division by zero, short
/// rolling window, missing input) is simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries<K: Ord> {
    name: String,
    points: BTreeMap<K, f64>,
}

/// Series indexed by period key, the pre-TTM form.
pub type PeriodValues = DerivedSeries<PeriodKey>;

/// Series indexed by calendar day, the post-alignment form.
pub type DailySeries = DerivedSeries<NaiveDate>;

impl<K: Ord + Copy + std::fmt::Debug> DerivedSeries<K> {
    /// Empty series called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    /// Build from `(key, value)` pairs, dropping undefined values.
    pub fn from_points<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut series = Self::new(name);
        for (key, value) in points {
            series.insert(key, value);
        }
        series
    }

    /// Set the value at `key`. Non-finite values are ignored; a later value
    /// for the same key replaces the earlier one.
    pub fn insert(&mut self, key: K, value: f64) {
        if !value.is_finite() {
            return;
        }
        match self.points.entry(key) {
            Entry::Occupied(mut slot) => {
                debug!(series = %self.name, ?key, "two periods share a key, keeping the later one");
                slot.insert(value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }

    /// Series name, used as a column header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same points under a new name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Value at `key`.
    pub fn get(&self, key: &K) -> Option<f64> {
        self.points.get(key).copied()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.points.iter().map(|(k, v)| (*k, *v))
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.points.keys().copied()
    }

    /// Values in key order.
    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Number of defined points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point is defined.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First defined point.
    pub fn first(&self) -> Option<(K, f64)> {
        self.points.iter().next().map(|(k, v)| (*k, *v))
    }

    /// Most recent defined point.
    pub fn last(&self) -> Option<(K, f64)> {
        self.points.iter().next_back().map(|(k, v)| (*k, *v))
    }

    /// Points whose key satisfies `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&K) -> bool,
    {
        Self {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }
}

impl<K: Ord + Copy + std::fmt::Debug> FromIterator<(K, f64)> for DerivedSeries<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self::from_points(String::new(), iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_values_are_absent() {
        let series = PeriodValues::from_points(
            "Gross Margin",
            [
                (PeriodKey::Year(2021), 40.0),
                (PeriodKey::Year(2022), f64::NAN),
                (PeriodKey::Year(2023), f64::INFINITY),
            ],
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(&PeriodKey::Year(2022)), None);
    }

    #[test]
    fn test_later_value_wins() {
        let mut series = PeriodValues::new("Revenue");
        series.insert(PeriodKey::Year(2023), 1.0);
        series.insert(PeriodKey::Year(2023), 2.0);
        assert_eq!(series.get(&PeriodKey::Year(2023)), Some(2.0));
    }

    #[test]
    fn test_first_last_and_filter() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let series: DailySeries = [(day(3), 3.0), (day(1), 1.0), (day(2), 2.0)]
            .into_iter()
            .collect();

        assert_eq!(series.first(), Some((day(1), 1.0)));
        assert_eq!(series.last(), Some((day(3), 3.0)));

        let tail = series.filtered(|d| *d >= day(2)).renamed("tail");
        assert_eq!(tail.name(), "tail");
        assert_eq!(tail.values(), vec![2.0, 3.0]);
    }
}
