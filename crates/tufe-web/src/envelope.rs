//! Response bodies: the plain payload, the generic error, and the optional
//! `__debug` section.

use serde::Serialize;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tufe_core::ProviderId;

pub const DEBUG_KEY: &str = "__debug";

/// Request-scoped diagnostics returned only to debug callers.
#[derive(Debug, Clone, Serialize)]
pub struct DebugSection {
    pub logs: Vec<String>,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub generated_at: String,
}

impl DebugSection {
    pub fn new(logs: Vec<String>, source_chain: Vec<ProviderId>, latency_ms: u64) -> Self {
        Self {
            logs,
            source_chain,
            latency_ms,
            generated_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

/// The only body an unavailable response carries for regular callers.
pub fn unavailable() -> Value {
    json!({ "error": "unavailable" })
}

/// Adds `__debug` to an object body. Non-object bodies are returned as-is.
pub fn with_debug(mut body: Value, debug: DebugSection) -> Value {
    if let (Value::Object(map), Ok(section)) = (&mut body, serde_json::to_value(debug)) {
        map.insert(DEBUG_KEY.to_owned(), section);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_body_is_exact() {
        assert_eq!(unavailable().to_string(), r#"{"error":"unavailable"}"#);
    }

    #[test]
    fn debug_section_is_attached() {
        let debug = DebugSection::new(
            vec!["[oecd-sdmx] failed: down".to_owned()],
            vec![ProviderId::OecdSdmx],
            12,
        );
        let body = with_debug(unavailable(), debug);

        assert_eq!(body["error"], "unavailable");
        assert_eq!(body[DEBUG_KEY]["source_chain"][0], "oecd-sdmx");
        assert_eq!(body[DEBUG_KEY]["logs"][0], "[oecd-sdmx] failed: down");
        assert_eq!(body[DEBUG_KEY]["latency_ms"], 12);
        assert!(body[DEBUG_KEY]["generated_at"].as_str().is_some_and(|at| at.ends_with('Z')));
    }
}
