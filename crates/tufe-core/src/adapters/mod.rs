//! Provider adapters.
//!
//! Each adapter maps a [`Measure`] to a provider URL, fetches it through a
//! shared [`SourceTransport`] and extracts a [`Series`](crate::Series).
//!
//! | Adapter | Provider | Measures |
//! |---------|----------|----------|
//! | [`OecdSdmxAdapter`] | `oecd-sdmx` | index, yoy, mom |
//! | [`OecdCsvAdapter`] | `oecd-csv` | index, yoy, mom |
//! | [`DbnomicsAdapter`] | `dbnomics` | index, yoy, mom |
//! | [`TcmbHtmlAdapter`] | `tcmb-html` | yoy, mom |

mod dbnomics;
mod oecd;
mod oecd_csv;
mod tcmb;

use std::sync::Arc;

pub use dbnomics::DbnomicsAdapter;
pub use oecd::OecdSdmxAdapter;
pub use oecd_csv::OecdCsvAdapter;
pub use tcmb::TcmbHtmlAdapter;

use crate::data_source::{DataSource, Measure, SeriesResponse, SourceError};
use crate::extract::{extract_traced, PayloadShape};
use crate::http_client::{HttpClient, HttpRequest};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::ProviderId;

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Shared HTTP plumbing for adapters: client, per-request timeout and retry.
#[derive(Clone)]
pub struct SourceTransport {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl SourceTransport {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            retry: RetryConfig::default(),
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Fetches `url`, mapping transport failures and non-2xx statuses to
    /// [`SourceError::unavailable`].
    pub async fn fetch(
        &self,
        provider: ProviderId,
        url: &str,
        accept: &str,
    ) -> Result<String, SourceError> {
        let request = HttpRequest::get(url)
            .with_header("accept", accept)
            .with_timeout_ms(self.timeout_ms);

        let response = execute_with_retry(self.http_client.as_ref(), request, &self.retry)
            .await
            .map_err(|e| SourceError::unavailable(format!("{provider} transport error: {e}")))?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "{provider} returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

/// Builds the adapter for `provider`.
pub fn adapter_for(provider: ProviderId, transport: SourceTransport) -> Arc<dyn DataSource> {
    match provider {
        ProviderId::OecdSdmx => Arc::new(OecdSdmxAdapter::new(transport)),
        ProviderId::OecdCsv => Arc::new(OecdCsvAdapter::new(transport)),
        ProviderId::Dbnomics => Arc::new(DbnomicsAdapter::new(transport)),
        ProviderId::TcmbHtml => Arc::new(TcmbHtmlAdapter::new(transport)),
    }
}

fn extract_response(
    provider: ProviderId,
    measure: Measure,
    body: &str,
    shape: PayloadShape,
) -> Result<SeriesResponse, SourceError> {
    let (strategy, series) = extract_traced(body, shape).ok_or_else(|| {
        SourceError::empty_series(format!("{provider} {measure} payload yielded no observations"))
    })?;

    if series.finite_count() == 0 {
        return Err(SourceError::empty_series(format!(
            "{provider} {measure} payload has no numeric values"
        )));
    }

    Ok(SeriesResponse {
        series,
        shape: strategy.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{FixtureHttpClient, HttpResponse};

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let client = Arc::new(
            FixtureHttpClient::new().with_response("cpi", HttpResponse::with_status(500, "boom")),
        );
        let transport = SourceTransport::new(client.clone()).with_retry(RetryConfig::no_retry());

        let error = transport
            .fetch(ProviderId::OecdSdmx, "https://stats.test/cpi", "application/json")
            .await
            .expect_err("500 is a failure");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(error.message(), "oecd-sdmx returned status 500");
        assert_eq!(client.request_count(), 1);
    }

    #[test]
    fn all_null_payload_is_empty_series() {
        let error = extract_response(
            ProviderId::Dbnomics,
            Measure::Index,
            r#"{"period":["2025-01"],"value":[null]}"#,
            PayloadShape::Auto,
        )
        .expect_err("no numbers");

        assert_eq!(error.kind(), SourceErrorKind::EmptySeries);
    }

    #[test]
    fn every_provider_has_an_adapter() {
        let transport = SourceTransport::new(Arc::new(FixtureHttpClient::new()));
        for provider in ProviderId::ALL {
            assert_eq!(adapter_for(provider, transport.clone()).id(), provider);
        }
    }
}
