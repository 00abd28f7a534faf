//! Locale-tolerant numeric coercion.
//!
//! Upstream providers disagree on how numbers travel: JSON numbers, JSON
//! strings, Turkish-style comma decimals (`"2,06"`), or placeholder text such
//! as `"NA"`. Everything funnels through [`parse_number`] / [`to_number`],
//! which return `None` as the single "not available" sentinel.

use serde_json::Value;

/// Parses a raw text cell into a finite float.
///
/// The first comma is treated as a decimal separator. Returns `None` for empty
/// input, placeholders, and anything that is not finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replacen(',', ".", 1);
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Coerces a JSON value into a finite float.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}
