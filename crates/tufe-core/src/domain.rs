use serde::{Deserialize, Serialize};

use crate::calc::IndexChanges;
use crate::error::CoreError;
use crate::period::to_display;

/// Latest-figures payload served by the endpoint.
///
/// `period` is in display form (`MM-YYYY`). Absent figures are omitted from
/// the JSON rather than serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg12_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoy_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_pct: Option<f64>,
    pub source: String,
}

impl ChangeResult {
    /// Builds a result from calculator output; `changes.period` is canonical.
    pub fn from_changes(changes: &IndexChanges, source: impl Into<String>) -> Self {
        Self {
            period: to_display(&changes.period),
            avg12_pct: Some(changes.avg12_pct),
            yoy_pct: changes.yoy_pct,
            monthly_pct: changes.monthly_pct,
            source: source.into(),
        }
    }

    /// Result carrying only a month-over-month figure.
    pub fn monthly_only(canonical_period: &str, monthly_pct: f64, source: impl Into<String>) -> Self {
        Self {
            period: to_display(canonical_period),
            avg12_pct: None,
            yoy_pct: None,
            monthly_pct: Some(monthly_pct),
            source: source.into(),
        }
    }

    /// JSON form of the payload; its string rendering is the cached body.
    pub fn to_value(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }
}
