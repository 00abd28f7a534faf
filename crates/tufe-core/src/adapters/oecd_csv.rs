use crate::data_source::{
    DataSource, Measure, SeriesRequest, SeriesResponse, SourceError, SourceFuture,
};
use crate::extract::{ExtractStrategy, PayloadShape};
use crate::ProviderId;

use super::{extract_response, SourceTransport};

const BASE_URL: &str =
    "https://sdmx.oecd.org/public/rest/data/OECD.SDD.TPS,DSD_PRICES@DF_PRICES_ALL,1.0";

/// OECD data explorer REST API returning CSV.
#[derive(Clone)]
pub struct OecdCsvAdapter {
    transport: SourceTransport,
}

impl OecdCsvAdapter {
    pub fn new(transport: SourceTransport) -> Self {
        Self { transport }
    }

    pub fn endpoint(measure: Measure) -> String {
        let key = match measure {
            Measure::Index => "TUR.M.N.CPI.IX._T.N._Z",
            Measure::YearOverYear => "TUR.M.N.CPI.PA._T.N.GY",
            Measure::MonthOverMonth => "TUR.M.N.CPI.PA._T.N.G1",
        };
        format!("{BASE_URL}/{key}?format=csv")
    }

    async fn fetch_series(&self, measure: Measure) -> Result<SeriesResponse, SourceError> {
        let body = self
            .transport
            .fetch(self.id(), &Self::endpoint(measure), "text/csv")
            .await?;

        extract_response(
            self.id(),
            measure,
            &body,
            PayloadShape::Only(ExtractStrategy::CsvColumnar),
        )
    }
}

impl DataSource for OecdCsvAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OecdCsv
    }

    fn label(&self) -> &'static str {
        "OECD DF_PRICES_ALL (CSV)"
    }

    fn supports(&self, _measure: Measure) -> bool {
        true
    }

    fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse> {
        Box::pin(async move { self.fetch_series(request.measure).await })
    }
}
