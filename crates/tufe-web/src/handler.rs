use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tufe_core::LATEST_CACHE_KEY;

use crate::envelope::{self, DebugSection};
use crate::AppState;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");
const JSON_UTF8: HeaderValue = HeaderValue::from_static("application/json; charset=utf-8");

/// How the body relates to the edge cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Debug request: cache read skipped.
    Bypass,
}

impl CacheStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    debug: Option<String>,
}

impl LatestQuery {
    /// `?debug`, `?debug=1` and `?debug=yes` enable it; `0` and `false` do not.
    pub fn debug_enabled(&self) -> bool {
        match self.debug.as_deref() {
            None => false,
            Some(value) => !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false"),
        }
    }
}

/// `GET /api/tufe/latest`
pub async fn latest(State(state): State<AppState>, Query(query): Query<LatestQuery>) -> Response {
    let started = Instant::now();
    let debug = query.debug_enabled();

    if !debug {
        if let Some(body) = state.cache.get(LATEST_CACHE_KEY).await {
            tracing::debug!("serving latest figures from cache");
            return json_response(&state, StatusCode::OK, body, CacheStatus::Hit);
        }
    }
    let cache_status = if debug {
        CacheStatus::Bypass
    } else {
        CacheStatus::Miss
    };

    let (success, chain, logs) = match state.router.route_latest().await {
        Ok(success) => {
            let chain = success.source_chain.clone();
            let logs = success.diagnostics.clone();
            (Some(success.data), chain, logs)
        }
        Err(failure) => {
            tracing::warn!(
                attempts = failure.source_chain.len(),
                latency_ms = failure.latency_ms,
                "all sources failed"
            );
            (None, failure.source_chain, failure.diagnostics)
        }
    };

    let Some(data) = success else {
        return unavailable(&state, debug, logs, chain, started, cache_status);
    };
    let value = match data.to_value() {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(%error, "failed to serialize latest figures");
            return unavailable(&state, debug, logs, chain, started, cache_status);
        }
    };

    let plain = value.to_string();
    let body = if debug {
        store_in_background(&state, plain);
        debug_body(value, logs, chain, started)
    } else {
        store_in_background(&state, plain.clone());
        plain
    };

    json_response(&state, StatusCode::OK, body, cache_status)
}

/// `GET /healthz`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn unavailable(
    state: &AppState,
    debug: bool,
    logs: Vec<String>,
    chain: Vec<tufe_core::ProviderId>,
    started: Instant,
    cache_status: CacheStatus,
) -> Response {
    let body = if debug {
        debug_body(envelope::unavailable(), logs, chain, started)
    } else {
        envelope::unavailable().to_string()
    };
    json_response(state, StatusCode::BAD_GATEWAY, body, cache_status)
}

fn debug_body(
    value: Value,
    logs: Vec<String>,
    chain: Vec<tufe_core::ProviderId>,
    started: Instant,
) -> String {
    let latency_ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;
    envelope::with_debug(value, DebugSection::new(logs, chain, latency_ms)).to_string()
}

fn store_in_background(state: &AppState, body: String) {
    let cache = state.cache.clone();
    let ttl = state.cache_ttl;
    tokio::spawn(async move {
        cache.put(LATEST_CACHE_KEY.to_owned(), body, ttl).await;
    });
}

fn json_response(state: &AppState, status: StatusCode, body: String, cache: CacheStatus) -> Response {
    (
        status,
        [
            (CONTENT_TYPE, JSON_UTF8),
            (CACHE_CONTROL, state.cache_control.clone()),
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (X_CACHE, HeaderValue::from_static(cache.as_str())),
        ],
        body,
    )
        .into_response()
}
