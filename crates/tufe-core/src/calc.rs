//! Index arithmetic: 12-month average change, year-over-year and
//! month-over-month figures.
//!
//! ```text
//! avg12_pct   = (mean(v[n-12..n]) / mean(v[n-24..n-12]) - 1) * 100
//! yoy_pct     = (v[n-1] / v[n-13] - 1) * 100
//! monthly_pct = (v[n-1] / v[n-2]  - 1) * 100
//! ```
//!
//! `v` holds the finite values up to the last finite observation. Interior
//! gaps are dropped, so they shift window contents rather than being filled.
//!
//! Month-over-month input is first compounded into a synthetic index with base
//! 100. The true base-period level is unknown, so the 12-month average
//! computed from rebuilt levels is an approximation of the published figure.

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::series::{Observation, Series};

/// Observations needed for two full 12-month windows.
pub const REQUIRED_HISTORY: usize = 24;
const WINDOW: usize = 12;
const REBASE_LEVEL: f64 = 100.0;

/// What the values of a series measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Base-100 style index levels.
    IndexLevel,
    /// Month-over-month percentage changes.
    MonthlyChange,
}

/// Rounded figures for the latest period of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexChanges {
    /// Canonical `YYYY-MM` period of the last finite observation.
    pub period: String,
    pub avg12_pct: f64,
    pub yoy_pct: Option<f64>,
    pub monthly_pct: Option<f64>,
}

/// Computes the 12-month average change and companions for `series`.
pub fn compute(series: &Series, kind: SeriesKind) -> Result<IndexChanges, CalcError> {
    let last = series.last_finite_index().ok_or(CalcError::NoFiniteValue)?;
    let observations = &series.observations()[..=last];
    let finite = finite_values(observations);

    let levels = match kind {
        SeriesKind::IndexLevel => finite,
        SeriesKind::MonthlyChange => rebase_monthly_changes(&finite),
    };

    let avg12_pct = average_change(&levels)?;
    Ok(IndexChanges {
        period: series.observations()[last].period.clone(),
        avg12_pct: round2(avg12_pct),
        yoy_pct: ratio_change(&levels, WINDOW).map(round2),
        monthly_pct: ratio_change(&levels, 1).map(round2),
    })
}

/// `(mean(last 12) / mean(previous 12) - 1) * 100` over finite levels.
pub fn average_change(levels: &[f64]) -> Result<f64, CalcError> {
    let available = levels.len();
    if available < REQUIRED_HISTORY {
        return Err(CalcError::InsufficientHistory {
            available,
            required: REQUIRED_HISTORY,
        });
    }

    let current = mean(&levels[available - WINDOW..]);
    let previous = mean(&levels[available - 2 * WINDOW..available - WINDOW]);
    if !current.is_finite() || !previous.is_finite() || previous == 0.0 {
        return Err(CalcError::DegenerateWindow);
    }

    let change = (current / previous - 1.0) * 100.0;
    if change.is_finite() {
        Ok(change)
    } else {
        Err(CalcError::DegenerateWindow)
    }
}

/// Compounds month-over-month changes into levels starting from base 100.
///
/// The output has one level per input change; the base itself is not emitted.
pub fn rebase_monthly_changes(changes: &[f64]) -> Vec<f64> {
    changes
        .iter()
        .scan(REBASE_LEVEL, |level, change| {
            *level *= 1.0 + change / 100.0;
            Some(*level)
        })
        .collect()
}

/// Last finite observation, used when only a month-over-month figure exists.
pub fn latest_value(series: &Series) -> Option<(&str, f64)> {
    let observation = series.last_finite()?;
    observation
        .value
        .map(|value| (observation.period.as_str(), value))
}

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio_change(levels: &[f64], lag: usize) -> Option<f64> {
    let last = *levels.last()?;
    let base = *levels.len().checked_sub(lag + 1).and_then(|index| levels.get(index))?;
    if !base.is_finite() || base == 0.0 {
        return None;
    }
    let change = (last / base - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

fn finite_values(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .filter_map(|observation| observation.value)
        .filter(|value| value.is_finite())
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
