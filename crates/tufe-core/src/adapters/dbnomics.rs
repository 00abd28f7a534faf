use crate::data_source::{
    DataSource, Measure, SeriesRequest, SeriesResponse, SourceError, SourceFuture,
};
use crate::extract::PayloadShape;
use crate::ProviderId;

use super::{extract_response, SourceTransport};

const BASE_URL: &str = "https://api.db.nomics.world/v22/series";

/// DBnomics mirror of the IMF consumer price dataset.
#[derive(Clone)]
pub struct DbnomicsAdapter {
    transport: SourceTransport,
}

impl DbnomicsAdapter {
    pub fn new(transport: SourceTransport) -> Self {
        Self { transport }
    }

    pub fn endpoint(measure: Measure) -> String {
        let code = match measure {
            Measure::Index => "M.TR.PCPI_IX",
            Measure::YearOverYear => "M.TR.PCPI_PC_CP_A_PT",
            Measure::MonthOverMonth => "M.TR.PCPI_PC_PP_PT",
        };
        format!(
            "{BASE_URL}/IMF/CPI/{}?observations=1&format=json",
            urlencoding::encode(code)
        )
    }

    async fn fetch_series(&self, measure: Measure) -> Result<SeriesResponse, SourceError> {
        let body = self
            .transport
            .fetch(self.id(), &Self::endpoint(measure), "application/json")
            .await?;

        // Documents usually sit under series.docs[0]; older mirrors return
        // bare parallel arrays or row pairs.
        extract_response(self.id(), measure, &body, PayloadShape::Auto)
    }
}

impl DataSource for DbnomicsAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Dbnomics
    }

    fn label(&self) -> &'static str {
        "DBnomics IMF/CPI"
    }

    fn supports(&self, _measure: Measure) -> bool {
        true
    }

    fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse> {
        Box::pin(async move { self.fetch_series(request.measure).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http_client::FixtureHttpClient;

    #[tokio::test]
    async fn wrapped_document_is_unwrapped() {
        let body = r#"{"series": {"docs": [{
            "series_code": "M.TR.PCPI_PC_CP_A_PT",
            "period": ["2025-05", "2025-06", "2025-07"],
            "value": [35.41, 35.05, "NA"]
        }]}}"#;
        let client = Arc::new(FixtureHttpClient::new().with_body("PCPI_PC_CP_A_PT", body));
        let adapter = DbnomicsAdapter::new(SourceTransport::new(client));

        let response = adapter
            .series(SeriesRequest::new(Measure::YearOverYear))
            .await
            .expect("series");

        assert_eq!(response.shape, "wrapped_parallel_arrays");
        assert_eq!(response.series.len(), 3);
        assert_eq!(response.series.last_finite().map(|o| o.period.as_str()), Some("2025-06"));
    }

    #[test]
    fn endpoint_names_imf_series() {
        assert_eq!(
            DbnomicsAdapter::endpoint(Measure::Index),
            "https://api.db.nomics.world/v22/series/IMF/CPI/M.TR.PCPI_IX?observations=1&format=json"
        );
    }
}
