use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::data_source::{
    DataSource, Measure, SeriesRequest, SeriesResponse, SourceError, SourceFuture,
};
use crate::scrape::{scrape_cpi_table, CpiTable};
use crate::ProviderId;

use super::SourceTransport;

const PAGE_URL: &str = "https://www.tcmb.gov.tr/wps/wcm/connect/TR/TCMB+TR/Main+Menu/Istatistikler/Enflasyon+Verileri/Tuketici+Fiyatlari";

/// One scraped page answers both measures for this long.
const PAGE_REUSE: Duration = Duration::from_secs(60);

/// Central bank inflation page, scraped. Publishes percentage changes only.
#[derive(Clone)]
pub struct TcmbHtmlAdapter {
    transport: SourceTransport,
    scraped: Arc<Mutex<Option<(Instant, CpiTable)>>>,
}

impl TcmbHtmlAdapter {
    pub fn new(transport: SourceTransport) -> Self {
        Self {
            transport,
            scraped: Arc::new(Mutex::new(None)),
        }
    }

    /// Scraped table, fetching the page only when the last scrape is stale.
    /// The lock is held across the fetch so concurrent lookups share it.
    async fn table(&self) -> Result<CpiTable, SourceError> {
        let mut scraped = self.scraped.lock().await;
        if let Some((scraped_at, table)) = scraped.as_ref() {
            if scraped_at.elapsed() < PAGE_REUSE {
                return Ok(table.clone());
            }
        }

        let html = self.transport.fetch(self.id(), PAGE_URL, "text/html").await?;
        let table = scrape_cpi_table(&html);
        if !table.is_empty() {
            *scraped = Some((Instant::now(), table.clone()));
        }
        Ok(table)
    }

    async fn fetch_series(&self, measure: Measure) -> Result<SeriesResponse, SourceError> {
        if !self.supports(measure) {
            return Err(SourceError::unsupported_measure(self.id(), measure));
        }

        let table = self.table().await?;
        let series = match measure {
            Measure::YearOverYear => table.annual,
            _ => table.monthly,
        };

        if series.finite_count() == 0 {
            return Err(SourceError::empty_series(format!(
                "{} page has no {measure} column values",
                self.id()
            )));
        }

        Ok(SeriesResponse {
            series,
            shape: "html_table",
        })
    }
}

impl DataSource for TcmbHtmlAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::TcmbHtml
    }

    fn label(&self) -> &'static str {
        "TCMB Tüketici Fiyatları (HTML)"
    }

    fn supports(&self, measure: Measure) -> bool {
        matches!(measure, Measure::YearOverYear | Measure::MonthOverMonth)
    }

    fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse> {
        Box::pin(async move { self.fetch_series(request.measure).await })
    }
}
