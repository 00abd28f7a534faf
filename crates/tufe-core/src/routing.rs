use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adapters::{adapter_for, SourceTransport};
use crate::calc::{self, round2, IndexChanges, SeriesKind};
use crate::data_source::{DataSource, Measure, SeriesRequest, SeriesResponse, SourceError};
use crate::domain::ChangeResult;
use crate::error::CalcError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::ProviderId;

/// Default upper bound for one candidate's primary fetch and computation.
pub const DEFAULT_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default upper bound for the concurrent yoy/mom lookups after a primary
/// result exists.
pub const DEFAULT_SUPPLEMENTARY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source selection strategy for routing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceStrategy {
    /// Every registered provider in the default order.
    #[default]
    Auto,
    Priority(Vec<ProviderId>),
}

/// One entry of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub provider: ProviderId,
    pub kind: SeriesKind,
    /// Accept a month-over-month figure alone when the history is too short
    /// for a 12-month average.
    pub monthly_only_ok: bool,
}

impl Candidate {
    pub const fn index(provider: ProviderId) -> Self {
        Self {
            provider,
            kind: SeriesKind::IndexLevel,
            monthly_only_ok: false,
        }
    }

    pub const fn monthly(provider: ProviderId, monthly_only_ok: bool) -> Self {
        Self {
            provider,
            kind: SeriesKind::MonthlyChange,
            monthly_only_ok,
        }
    }

    /// How each provider is tried by default.
    pub const fn default_for(provider: ProviderId) -> Self {
        match provider {
            ProviderId::TcmbHtml => Self::monthly(provider, true),
            _ => Self::index(provider),
        }
    }
}

/// Router-facing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    pub strategy: SourceStrategy,
    pub candidate_timeout: Duration,
    pub supplementary_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: SourceStrategy::Auto,
            candidate_timeout: DEFAULT_CANDIDATE_TIMEOUT,
            supplementary_timeout: DEFAULT_SUPPLEMENTARY_TIMEOUT,
        }
    }
}

/// Primary figures for a candidate, before supplementary lookups.
enum Primary {
    Computed {
        changes: IndexChanges,
        published_mom: Option<f64>,
    },
    MonthlyOnly {
        period: String,
        monthly_pct: f64,
    },
}

/// Successful routed call.
#[derive(Debug, Clone)]
pub struct RouteSuccess<T> {
    pub data: T,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub diagnostics: Vec<String>,
    pub latency_ms: u64,
}

/// Failed routed call after exhausting candidates.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub source_chain: Vec<ProviderId>,
    pub diagnostics: Vec<String>,
    pub latency_ms: u64,
}

pub type RouteResult<T> = Result<RouteSuccess<T>, RouteFailure>;

/// Builder wiring adapters to a shared transport.
///
/// ```rust,ignore
/// let router = SourceRouterBuilder::new()
///     .with_providers(vec![ProviderId::Dbnomics, ProviderId::TcmbHtml])
///     .with_retry(RetryConfig::exponential(2))
///     .build();
/// ```
#[derive(Default)]
pub struct SourceRouterBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    providers: Option<Vec<ProviderId>>,
    retry: RetryConfig,
    http_timeout_ms: Option<u64>,
    candidate_timeout: Option<Duration>,
    supplementary_timeout: Option<Duration>,
}

impl SourceRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport shared by every adapter. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Restricts and orders the providers tried.
    pub fn with_providers(mut self, providers: Vec<ProviderId>) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_http_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_candidate_timeout(mut self, timeout: Duration) -> Self {
        self.candidate_timeout = Some(timeout);
        self
    }

    pub fn with_supplementary_timeout(mut self, timeout: Duration) -> Self {
        self.supplementary_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> SourceRouter {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let mut transport = SourceTransport::new(http_client).with_retry(self.retry);
        if let Some(timeout_ms) = self.http_timeout_ms {
            transport = transport.with_timeout_ms(timeout_ms);
        }

        let adapters = ProviderId::ALL
            .into_iter()
            .map(|provider| adapter_for(provider, transport.clone()))
            .collect();
        let config = RouterConfig {
            strategy: self
                .providers
                .map(SourceStrategy::Priority)
                .unwrap_or_default(),
            candidate_timeout: self
                .candidate_timeout
                .unwrap_or(DEFAULT_CANDIDATE_TIMEOUT),
            supplementary_timeout: self
                .supplementary_timeout
                .unwrap_or(DEFAULT_SUPPLEMENTARY_TIMEOUT),
        };

        SourceRouter::new(adapters, config)
    }
}

/// Adapter registry and fallback engine.
pub struct SourceRouter {
    adapters: HashMap<ProviderId, Arc<dyn DataSource>>,
    config: RouterConfig,
}

impl SourceRouter {
    pub fn new(adapters: Vec<Arc<dyn DataSource>>, config: RouterConfig) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self { adapters, config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Fallback chain for the configured strategy.
    pub fn candidates(&self) -> Vec<Candidate> {
        let providers = match &self.config.strategy {
            SourceStrategy::Auto => ProviderId::ALL
                .into_iter()
                .filter(|provider| self.adapters.contains_key(provider))
                .collect(),
            SourceStrategy::Priority(priority) => dedupe_chain(priority),
        };

        providers.into_iter().map(Candidate::default_for).collect()
    }

    /// Walks the candidates in order and returns the first usable result.
    pub async fn route_latest(&self) -> RouteResult<ChangeResult> {
        let started = Instant::now();
        let candidates = self.candidates();
        let mut source_chain = Vec::with_capacity(candidates.len());
        let mut diagnostics = Vec::new();

        for candidate in candidates {
            let provider = candidate.provider;
            source_chain.push(provider);

            let Some(adapter) = self.adapters.get(&provider) else {
                diagnostics.push(format!("[{provider}] source adapter is not registered"));
                continue;
            };

            tracing::debug!(
                provider = %provider,
                kind = ?candidate.kind,
                "attempting candidate"
            );

            let mut notes = Vec::new();
            let outcome = tokio::time::timeout(
                self.config.candidate_timeout,
                self.primary(adapter.as_ref(), candidate, &mut notes),
            )
            .await;

            let failure = match outcome {
                Ok(Ok(primary)) => {
                    let data = self
                        .complete(adapter.as_ref(), candidate, primary, &mut notes)
                        .await;
                    diagnostics.extend(notes.into_iter().map(|note| format!("[{provider}] {note}")));
                    tracing::info!(
                        provider = %provider,
                        period = %data.period,
                        failed_attempts = source_chain.len() - 1,
                        "selected source"
                    );
                    diagnostics.push(format!("[{provider}] selected"));
                    return Ok(RouteSuccess {
                        data,
                        selected_source: provider,
                        source_chain,
                        diagnostics,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Ok(Err(reason)) => reason,
                Err(_) => format!(
                    "timed out after {} ms",
                    self.config.candidate_timeout.as_millis()
                ),
            };

            diagnostics.extend(notes.into_iter().map(|note| format!("[{provider}] {note}")));
            tracing::warn!(provider = %provider, reason = %failure, "candidate failed");
            diagnostics.push(format!("[{provider}] failed: {failure}"));
        }

        if source_chain.is_empty() {
            diagnostics.push(String::from("no source candidates configured"));
        }

        Err(RouteFailure {
            source_chain,
            diagnostics,
            latency_ms: elapsed_ms(started),
        })
    }

    /// Fetches and computes the candidate's own series. This is the part
    /// bounded by the candidate timeout.
    async fn primary(
        &self,
        adapter: &dyn DataSource,
        candidate: Candidate,
        notes: &mut Vec<String>,
    ) -> Result<Primary, String> {
        let measure = Measure::for_kind(candidate.kind);
        if !adapter.supports(measure) {
            return Err(SourceError::unsupported_measure(adapter.id(), measure).to_string());
        }

        let primary = adapter
            .series(SeriesRequest::new(measure))
            .await
            .map_err(|error| error.to_string())?;
        notes.push(describe(measure, &primary));

        match calc::compute(&primary.series, candidate.kind) {
            Ok(changes) => {
                let published_mom = match candidate.kind {
                    SeriesKind::MonthlyChange => primary.series.value_at(&changes.period).map(round2),
                    SeriesKind::IndexLevel => None,
                };
                Ok(Primary::Computed {
                    changes,
                    published_mom,
                })
            }
            Err(error @ CalcError::InsufficientHistory { .. })
                if candidate.monthly_only_ok && candidate.kind == SeriesKind::MonthlyChange =>
            {
                let (period, value) = calc::latest_value(&primary.series)
                    .ok_or_else(|| CalcError::NoFiniteValue.to_string())?;
                notes.push(format!("{error}; falling back to latest monthly change"));
                Ok(Primary::MonthlyOnly {
                    period: period.to_owned(),
                    monthly_pct: round2(value),
                })
            }
            Err(error) => Err(error.to_string()),
        }
    }

    /// Fills yoy/mom from published series where available. Never fails.
    async fn complete(
        &self,
        adapter: &dyn DataSource,
        candidate: Candidate,
        primary: Primary,
        notes: &mut Vec<String>,
    ) -> ChangeResult {
        let measure = Measure::for_kind(candidate.kind);
        match primary {
            Primary::Computed {
                changes,
                published_mom,
            } => {
                let (yoy, mom) = self
                    .supplementary(adapter, measure, &changes.period, notes)
                    .await;
                let mut result = ChangeResult::from_changes(&changes, adapter.label());
                result.yoy_pct = yoy.or(changes.yoy_pct);
                result.monthly_pct = mom.or(published_mom).or(changes.monthly_pct);
                result
            }
            Primary::MonthlyOnly {
                period,
                monthly_pct,
            } => {
                let (yoy, _) = self.supplementary(adapter, measure, &period, notes).await;
                let mut result = ChangeResult::monthly_only(&period, monthly_pct, adapter.label());
                result.yoy_pct = yoy;
                result
            }
        }
    }

    /// Fetches the provider's published yoy and mom series concurrently and
    /// reads them at exactly `period`. Failures and timeouts only cost the
    /// figures.
    async fn supplementary(
        &self,
        adapter: &dyn DataSource,
        primary: Measure,
        period: &str,
        notes: &mut Vec<String>,
    ) -> (Option<f64>, Option<f64>) {
        let lookups = tokio::time::timeout(self.config.supplementary_timeout, async {
            tokio::join!(
                published_value(adapter, Measure::YearOverYear, primary, period),
                published_value(adapter, Measure::MonthOverMonth, primary, period),
            )
        })
        .await;
        let Ok((yoy, mom)) = lookups else {
            let timeout_ms = self.config.supplementary_timeout.as_millis() as u64;
            tracing::debug!(provider = %adapter.id(), timeout_ms, "supplementary fetch timed out");
            notes.push(format!("supplementary fetch timed out after {timeout_ms} ms"));
            return (None, None);
        };

        let mut read = |lookup: Option<Lookup>| {
            let lookup = lookup?;
            if lookup.value.is_none() {
                tracing::debug!(provider = %adapter.id(), note = %lookup.note, "supplementary figure unavailable");
            }
            notes.push(lookup.note);
            lookup.value
        };
        let yoy = read(yoy);
        let mom = read(mom);
        (yoy, mom)
    }
}

struct Lookup {
    value: Option<f64>,
    note: String,
}

async fn published_value(
    adapter: &dyn DataSource,
    measure: Measure,
    primary: Measure,
    period: &str,
) -> Option<Lookup> {
    if measure == primary || !adapter.supports(measure) {
        return None;
    }

    let lookup = match adapter.series(SeriesRequest::new(measure)).await {
        Ok(response) => match response.series.value_at(period) {
            Some(value) => Lookup {
                value: Some(round2(value)),
                note: format!("{measure} published for {period}"),
            },
            None => Lookup {
                value: None,
                note: format!(
                    "{measure} has no value for {period} (latest {})",
                    response.series.last_period().unwrap_or("none")
                ),
            },
        },
        Err(error) => Lookup {
            value: None,
            note: format!("{measure} fetch failed: {error}"),
        },
    };
    Some(lookup)
}

fn describe(measure: Measure, response: &SeriesResponse) -> String {
    let series = &response.series;
    format!(
        "{measure} series via {}: {} observations, {} with values, {}..{}",
        response.shape,
        series.len(),
        series.finite_count(),
        series.first_period().unwrap_or("?"),
        series.last_period().unwrap_or("?"),
    )
}

fn dedupe_chain(chain: &[ProviderId]) -> Vec<ProviderId> {
    let mut seen = HashSet::new();
    let mut output = Vec::with_capacity(chain.len());

    for provider in chain {
        if seen.insert(*provider) {
            output.push(*provider);
        }
    }

    output
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::data_source::SourceFuture;
    use crate::series::Series;

    struct StubSource {
        id: ProviderId,
        measures: Vec<(Measure, Result<Series, SourceError>)>,
        delay: Duration,
        delays: Vec<(Measure, Duration)>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(id: ProviderId) -> Self {
            Self {
                id,
                measures: Vec::new(),
                delay: Duration::ZERO,
                delays: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with(mut self, measure: Measure, series: Result<Series, SourceError>) -> Self {
            self.measures.push((measure, series));
            self
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn slow_for(mut self, measure: Measure, delay: Duration) -> Self {
            self.delays.push((measure, delay));
            self
        }
    }

    impl DataSource for StubSource {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn label(&self) -> &'static str {
            "stub"
        }

        fn supports(&self, measure: Measure) -> bool {
            self.measures.iter().any(|(supported, _)| *supported == measure)
        }

        fn series<'a>(&'a self, request: SeriesRequest) -> SourceFuture<'a, SeriesResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self
                .delays
                .iter()
                .find(|(measure, _)| *measure == request.measure)
                .map_or(self.delay, |(_, delay)| *delay);
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let (_, series) = self
                    .measures
                    .iter()
                    .find(|(measure, _)| *measure == request.measure)
                    .ok_or_else(|| SourceError::unsupported_measure(self.id, request.measure))?;
                series.clone().map(|series| SeriesResponse {
                    series,
                    shape: "stub",
                })
            })
        }
    }

    fn monthly(values: &[f64]) -> Series {
        Series::from_points(values.iter().enumerate().map(|(index, value)| {
            (
                format!("{:04}-{:02}", 2023 + index / 12, index % 12 + 1),
                Some(*value),
            )
        }))
    }

    fn index_levels() -> Series {
        let values = (0..24)
            .map(|index| if index < 12 { 100.0 } else { 110.0 })
            .collect::<Vec<_>>();
        monthly(&values)
    }

    fn router(sources: Vec<Arc<dyn DataSource>>, priority: Vec<ProviderId>) -> SourceRouter {
        SourceRouter::new(
            sources,
            RouterConfig {
                strategy: SourceStrategy::Priority(priority),
                candidate_timeout: Duration::from_millis(200),
                ..RouterConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn exact_period_supplementary_overrides_computed_values() {
        let yoy = Series::from_points([("2024-11", Some(9.0)), ("2024-12", Some(9.876))]);
        let source = StubSource::new(ProviderId::OecdSdmx)
            .with(Measure::Index, Ok(index_levels()))
            .with(Measure::YearOverYear, Ok(yoy))
            .with(Measure::MonthOverMonth, Ok(Series::from_points([("2024-11", Some(0.5))])));
        let router = router(vec![Arc::new(source)], vec![ProviderId::OecdSdmx]);

        let success = router.route_latest().await.expect("route succeeds");

        assert_eq!(success.data.period, "12-2024");
        assert_eq!(success.data.avg12_pct, Some(10.0));
        assert_eq!(success.data.yoy_pct, Some(9.88));
        // Published mom lacks 2024-12, so the computed value stands.
        assert_eq!(success.data.monthly_pct, Some(0.0));
        assert!(success
            .diagnostics
            .iter()
            .any(|line| line.contains("mom has no value for 2024-12")));
    }

    #[tokio::test]
    async fn supplementary_failure_keeps_primary() {
        let source = StubSource::new(ProviderId::OecdSdmx)
            .with(Measure::Index, Ok(index_levels()))
            .with(Measure::YearOverYear, Err(SourceError::unavailable("down")));
        let router = router(vec![Arc::new(source)], vec![ProviderId::OecdSdmx]);

        let success = router.route_latest().await.expect("route succeeds");
        assert_eq!(success.data.yoy_pct, Some(10.0));
        assert_eq!(success.selected_source, ProviderId::OecdSdmx);
    }

    #[tokio::test]
    async fn short_history_falls_through_to_next_candidate() {
        let short = StubSource::new(ProviderId::OecdSdmx).with(Measure::Index, Ok(monthly(&[100.0; 10])));
        let full = StubSource::new(ProviderId::Dbnomics).with(Measure::Index, Ok(index_levels()));
        let router = router(
            vec![Arc::new(short), Arc::new(full)],
            vec![ProviderId::OecdSdmx, ProviderId::Dbnomics],
        );

        let success = router.route_latest().await.expect("fallback succeeds");

        assert_eq!(success.selected_source, ProviderId::Dbnomics);
        assert_eq!(success.source_chain, vec![ProviderId::OecdSdmx, ProviderId::Dbnomics]);
        assert!(success.diagnostics.iter().any(|line| {
            line.starts_with("[oecd-sdmx] failed: insufficient history: 10 finite observations")
        }));
    }

    #[tokio::test]
    async fn monthly_only_candidate_returns_latest_change() {
        let source = StubSource::new(ProviderId::TcmbHtml)
            .with(Measure::MonthOverMonth, Ok(monthly(&[1.5, 2.064])))
            .with(Measure::YearOverYear, Ok(monthly(&[40.0, 33.52])));
        let router = router(vec![Arc::new(source)], vec![ProviderId::TcmbHtml]);

        let success = router.route_latest().await.expect("monthly only");

        assert_eq!(success.data.period, "02-2023");
        assert_eq!(success.data.avg12_pct, None);
        assert_eq!(success.data.monthly_pct, Some(2.06));
        assert_eq!(success.data.yoy_pct, Some(33.52));
    }

    #[tokio::test]
    async fn slow_candidate_times_out_and_next_is_tried() {
        let slow = StubSource::new(ProviderId::OecdSdmx)
            .with(Measure::Index, Ok(index_levels()))
            .slow(Duration::from_secs(5));
        let fast = StubSource::new(ProviderId::OecdCsv).with(Measure::Index, Ok(index_levels()));
        let router = router(
            vec![Arc::new(slow), Arc::new(fast)],
            vec![ProviderId::OecdSdmx, ProviderId::OecdCsv],
        );

        let success = router.route_latest().await.expect("fast source wins");

        assert_eq!(success.selected_source, ProviderId::OecdCsv);
        assert!(success
            .diagnostics
            .contains(&String::from("[oecd-sdmx] failed: timed out after 200 ms")));
    }

    #[tokio::test]
    async fn hung_supplementary_fetches_keep_the_computed_result() {
        let source = StubSource::new(ProviderId::OecdSdmx)
            .with(Measure::Index, Ok(index_levels()))
            .with(Measure::YearOverYear, Ok(index_levels()))
            .with(Measure::MonthOverMonth, Ok(index_levels()))
            .slow_for(Measure::YearOverYear, Duration::from_secs(5))
            .slow_for(Measure::MonthOverMonth, Duration::from_secs(5));
        let router = SourceRouter::new(
            vec![Arc::new(source)],
            RouterConfig {
                strategy: SourceStrategy::Priority(vec![ProviderId::OecdSdmx]),
                candidate_timeout: Duration::from_millis(200),
                supplementary_timeout: Duration::from_millis(300),
            },
        );

        let success = router.route_latest().await.expect("primary figures survive");

        assert_eq!(success.selected_source, ProviderId::OecdSdmx);
        assert_eq!(success.data.avg12_pct, Some(10.0));
        assert_eq!(success.data.yoy_pct, Some(10.0));
        assert_eq!(success.data.monthly_pct, Some(0.0));
        assert!(success
            .diagnostics
            .contains(&String::from("[oecd-sdmx] supplementary fetch timed out after 300 ms")));
        assert!(!success.diagnostics.iter().any(|line| line.contains("failed:")));
    }

    #[tokio::test]
    async fn all_failures_report_every_candidate() {
        let failing = Arc::new(
            StubSource::new(ProviderId::OecdSdmx)
                .with(Measure::Index, Err(SourceError::empty_series("nothing"))),
        );
        let router = router(
            vec![failing.clone() as Arc<dyn DataSource>],
            vec![ProviderId::OecdSdmx, ProviderId::Dbnomics, ProviderId::OecdSdmx],
        );

        let failure = router.route_latest().await.expect_err("nothing usable");

        assert_eq!(failure.source_chain, vec![ProviderId::OecdSdmx, ProviderId::Dbnomics]);
        assert_eq!(failure.diagnostics.len(), 2);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_strategy_uses_default_order_and_kinds() {
        let router = SourceRouterBuilder::new()
            .with_http_client(Arc::new(crate::http_client::FixtureHttpClient::new()))
            .build();

        let candidates = router.candidates();
        assert_eq!(
            candidates.iter().map(|c| c.provider).collect::<Vec<_>>(),
            ProviderId::ALL.to_vec()
        );
        assert_eq!(candidates[3], Candidate::monthly(ProviderId::TcmbHtml, true));
        assert_eq!(candidates[0].kind, SeriesKind::IndexLevel);
    }
}
