//! HTTP edge for the latest TÜFE figures.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/tufe/latest` | Latest period, 12-month average, yoy and mom changes |
//! | `GET /healthz` | Liveness probe |

pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tufe_core::{EdgeCache, SourceRouter, DEFAULT_TTL};

pub use config::ServerConfig;
pub use error::ServerError;

pub const LATEST_PATH: &str = "/api/tufe/latest";

/// Shared handler state: the source router and the injected cache.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SourceRouter>,
    pub cache: Arc<dyn EdgeCache>,
    pub cache_ttl: Duration,
    cache_control: HeaderValue,
}

impl AppState {
    pub fn new(router: Arc<SourceRouter>, cache: Arc<dyn EdgeCache>) -> Self {
        Self::with_ttl(router, cache, DEFAULT_TTL)
    }

    pub fn with_ttl(router: Arc<SourceRouter>, cache: Arc<dyn EdgeCache>, cache_ttl: Duration) -> Self {
        let cache_control = HeaderValue::from_str(&format!("public, max-age={}", cache_ttl.as_secs()))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=21600"));
        Self {
            router,
            cache,
            cache_ttl,
            cache_control,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(LATEST_PATH, get(handler::latest))
        .route("/healthz", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
