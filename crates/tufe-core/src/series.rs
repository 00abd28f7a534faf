use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::period;

/// One monthly data point. `value` is `None` when the provider published the
/// period without a usable number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub period: String,
    pub value: Option<f64>,
}

/// Ascending, deduplicated monthly series keyed by canonical period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a series from raw `(period, value)` pairs in any order.
    ///
    /// Periods are normalized, non-finite values become `None`, and when a
    /// period repeats the later present value wins. A present value is never
    /// replaced by an absent one.
    pub fn from_points<I, P>(points: I) -> Self
    where
        I: IntoIterator<Item = (P, Option<f64>)>,
        P: AsRef<str>,
    {
        let mut by_period: BTreeMap<String, Option<f64>> = BTreeMap::new();
        for (raw_period, value) in points {
            let key = period::normalize(raw_period.as_ref());
            if key.trim().is_empty() {
                continue;
            }
            let value = value.filter(|value| value.is_finite());
            let slot = by_period.entry(key).or_insert(None);
            if value.is_some() {
                *slot = value;
            }
        }

        Self {
            observations: by_period
                .into_iter()
                .map(|(period, value)| Observation { period, value })
                .collect(),
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations carrying a value.
    pub fn finite_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|observation| observation.value.is_some())
            .count()
    }

    /// Index of the last observation with a value, skipping trailing gaps.
    pub fn last_finite_index(&self) -> Option<usize> {
        self.observations
            .iter()
            .rposition(|observation| observation.value.is_some())
    }

    pub fn last_finite(&self) -> Option<&Observation> {
        self.last_finite_index().map(|index| &self.observations[index])
    }

    /// Value published for exactly `period` (canonical form).
    pub fn value_at(&self, period: &str) -> Option<f64> {
        self.observations
            .binary_search_by(|observation| observation.period.as_str().cmp(period))
            .ok()
            .and_then(|index| self.observations[index].value)
    }

    pub fn first_period(&self) -> Option<&str> {
        self.observations.first().map(|observation| observation.period.as_str())
    }

    pub fn last_period(&self) -> Option<&str> {
        self.observations.last().map(|observation| observation.period.as_str())
    }
}
