use crate::data_source::{
    DataSource, Measure, SeriesRequest, SeriesResponse, SourceError, SourceFuture,
};
use crate::extract::{ExtractStrategy, PayloadShape};
use crate::ProviderId;

use super::{extract_response, SourceTransport};

const BASE_URL: &str = "https://stats.oecd.org/SDMX-JSON/data/PRICES_CPI";

/// OECD main economic indicators, SDMX-JSON flavour.
#[derive(Clone)]
pub struct OecdSdmxAdapter {
    transport: SourceTransport,
}

impl OecdSdmxAdapter {
    pub fn new(transport: SourceTransport) -> Self {
        Self { transport }
    }

    pub fn endpoint(measure: Measure) -> String {
        let subject = match measure {
            Measure::Index => "IXOB",
            Measure::YearOverYear => "GY",
            Measure::MonthOverMonth => "GP",
        };
        format!("{BASE_URL}/TUR.CPALTT01.{subject}.M/all")
    }

    async fn fetch_series(&self, measure: Measure) -> Result<SeriesResponse, SourceError> {
        let body = self
            .transport
            .fetch(self.id(), &Self::endpoint(measure), "application/json")
            .await?;

        extract_response(
            self.id(),
            measure,
            &body,
            PayloadShape::Only(ExtractStrategy::DimensionMap),
        )
    }
}

impl DataSource for OecdSdmxAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OecdSdmx
    }

    fn label(&self) -> &'static str {
        "OECD PRICES_CPI (SDMX-JSON)"
    }

    fn supports(&self, _measure: Measure) -> bool {
        true
    }

    fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse> {
        Box::pin(async move { self.fetch_series(request.measure).await })
    }
}
