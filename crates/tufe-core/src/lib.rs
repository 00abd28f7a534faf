//! # TÜFE Core
//!
//! Series normalization and index arithmetic behind the latest Turkish CPI
//! figures endpoint.
//!
//! ## Overview
//!
//! - **Numeric coercion and periods**: lenient number parsing and canonical
//!   `YYYY-MM` periods
//! - **Series extraction** from SDMX-JSON, CSV, JSON arrays and an HTML table
//! - **Calculator** for the 12-month average, year-over-year and
//!   month-over-month changes
//! - **Provider adapters** behind the [`DataSource`] trait
//! - **Routing** with sequential fallback, per-candidate timeouts and
//!   supplementary fetches
//! - **Edge cache** capability for serialized bodies
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | OECD SDMX, OECD CSV, DBnomics and TCMB adapters |
//! | [`cache`] | `EdgeCache` trait and in-memory implementation |
//! | [`calc`] | Average-change calculator |
//! | [`data_source`] | Adapter contract and source errors |
//! | [`domain`] | Response payload |
//! | [`error`] | Core error types |
//! | [`extract`] | Payload-shape strategies |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`number`] | Numeric coercion |
//! | [`period`] | Period normalization |
//! | [`retry`] | Backoff and bounded retry |
//! | [`routing`] | Candidate fallback engine |
//! | [`scrape`] | HTML table scraper |
//! | [`series`] | Monthly series model |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tufe_core::SourceRouterBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = SourceRouterBuilder::new().build();
//!     match router.route_latest().await {
//!         Ok(success) => println!("{} via {}", success.data.period, success.data.source),
//!         Err(failure) => eprintln!("{:#?}", failure.diagnostics),
//!     }
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod calc;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod number;
pub mod period;
pub mod retry;
pub mod routing;
pub mod scrape;
pub mod series;
pub mod source;

pub use adapters::{
    adapter_for, DbnomicsAdapter, OecdCsvAdapter, OecdSdmxAdapter, SourceTransport,
    TcmbHtmlAdapter,
};
pub use cache::{EdgeCache, MemoryCache, DEFAULT_TTL, LATEST_CACHE_KEY};
pub use calc::{compute, IndexChanges, SeriesKind, REQUIRED_HISTORY};
pub use data_source::{
    DataSource, Measure, SeriesRequest, SeriesResponse, SourceError, SourceErrorKind,
};
pub use domain::ChangeResult;
pub use error::{CalcError, CoreError, ValidationError};
pub use extract::{extract, ExtractStrategy, PayloadShape};
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use period::Period;
pub use retry::{Backoff, RetryConfig};
pub use routing::{
    Candidate, RouteFailure, RouteResult, RouteSuccess, RouterConfig, SourceRouter,
    SourceRouterBuilder, SourceStrategy,
};
pub use series::{Observation, Series};
pub use source::ProviderId;
