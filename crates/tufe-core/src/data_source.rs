//! Data source trait and request/response types.
//!
//! Every provider adapter implements [`DataSource`]. A request names one
//! [`Measure`]; the response is a normalized [`Series`] plus the payload shape
//! it was read from.
//!
//! | Measure | Values | Calculator input |
//! |---------|--------|------------------|
//! | [`Measure::Index`] | index levels | [`SeriesKind::IndexLevel`] |
//! | [`Measure::YearOverYear`] | published annual % change | none, read as-is |
//! | [`Measure::MonthOverMonth`] | published monthly % change | [`SeriesKind::MonthlyChange`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::calc::SeriesKind;
use crate::series::Series;
use crate::ProviderId;

/// Which published CPI series to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Index,
    YearOverYear,
    MonthOverMonth,
}

impl Measure {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::YearOverYear => "yoy",
            Self::MonthOverMonth => "mom",
        }
    }

    /// Measure a router candidate must fetch to feed the calculator.
    pub const fn for_kind(kind: SeriesKind) -> Self {
        match kind {
            SeriesKind::IndexLevel => Self::Index,
            SeriesKind::MonthlyChange => Self::MonthOverMonth,
        }
    }
}

impl Display for Measure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedMeasure,
    /// Transport failure or non-2xx status.
    Unavailable,
    /// Response parsed to nothing usable.
    EmptySeries,
}

/// Structured source error used by router fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unsupported_measure(provider: ProviderId, measure: Measure) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedMeasure,
            message: format!("measure '{measure}' is not supported by source '{provider}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn empty_series(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::EmptySeries,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedMeasure => "source.unsupported_measure",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::EmptySeries => "source.empty_series",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for a series fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRequest {
    pub measure: Measure,
}

impl SeriesRequest {
    pub const fn new(measure: Measure) -> Self {
        Self { measure }
    }
}

/// A fetched series and the payload shape it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResponse {
    pub series: Series,
    pub shape: &'static str,
}

/// Boxed future returned by adapter calls.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the router shares them across
/// concurrent supplementary fetches.
pub trait DataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Human-readable attribution placed in the response `source` field.
    fn label(&self) -> &'static str;

    fn supports(&self, measure: Measure) -> bool;

    fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse>;
}
