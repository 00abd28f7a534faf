//! Server configuration from flags and `TUFE_*` environment variables.
//!
//! | Flag | Env | Default |
//! |------|-----|---------|
//! | `--bind` | `TUFE_BIND` | `0.0.0.0:8080` |
//! | `--log-filter` | `TUFE_LOG` | `info,tufe_core=debug,tufe_web=debug` |
//! | `--log-json` | `TUFE_LOG_JSON` | off |
//! | `--sources` | `TUFE_SOURCES` | every provider, default order |
//! | `--http-timeout-ms` | `TUFE_HTTP_TIMEOUT_MS` | `10000` |
//! | `--candidate-timeout-ms` | `TUFE_CANDIDATE_TIMEOUT_MS` | `15000` |
//! | `--supplementary-timeout-ms` | `TUFE_SUPPLEMENTARY_TIMEOUT_MS` | `5000` |
//! | `--retries` | `TUFE_RETRIES` | `1` |
//! | `--cache-ttl-secs` | `TUFE_CACHE_TTL_SECS` | `21600` |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tufe_core::{HttpClient, ProviderId, RetryConfig, SourceRouterBuilder, ValidationError};

/// Comma-separated provider priority, validated at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceList(pub Vec<ProviderId>);

fn parse_sources(value: &str) -> Result<SourceList, ValidationError> {
    ProviderId::parse_list(value).map(SourceList)
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "tufe-server",
    version,
    about = "Serves the latest Turkish CPI figures at /api/tufe/latest"
)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, env = "TUFE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// `tracing` filter directive; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "TUFE_LOG", default_value = "info,tufe_core=debug,tufe_web=debug")]
    pub log_filter: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "TUFE_LOG_JSON")]
    pub log_json: bool,

    /// Provider priority, e.g. `dbnomics,oecd-sdmx`.
    #[arg(long, env = "TUFE_SOURCES", value_parser = parse_sources)]
    pub sources: Option<SourceList>,

    #[arg(long, env = "TUFE_HTTP_TIMEOUT_MS", default_value_t = 10_000)]
    pub http_timeout_ms: u64,

    #[arg(long, env = "TUFE_CANDIDATE_TIMEOUT_MS", default_value_t = 15_000)]
    pub candidate_timeout_ms: u64,

    /// Bound on the published yoy/mom lookups once a candidate has figures.
    #[arg(long, env = "TUFE_SUPPLEMENTARY_TIMEOUT_MS", default_value_t = 5_000)]
    pub supplementary_timeout_ms: u64,

    /// Retries per upstream request on transient failures.
    #[arg(long, env = "TUFE_RETRIES", default_value_t = 1)]
    pub retries: u32,

    #[arg(long, env = "TUFE_CACHE_TTL_SECS", default_value_t = 21_600)]
    pub cache_ttl_secs: u64,
}

impl ServerConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn router_builder(&self, http_client: Arc<dyn HttpClient>) -> SourceRouterBuilder {
        let builder = SourceRouterBuilder::new()
            .with_http_client(http_client)
            .with_retry(RetryConfig::exponential(self.retries))
            .with_http_timeout_ms(self.http_timeout_ms)
            .with_candidate_timeout(Duration::from_millis(self.candidate_timeout_ms))
            .with_supplementary_timeout(Duration::from_millis(self.supplementary_timeout_ms));

        match &self.sources {
            Some(SourceList(providers)) => builder.with_providers(providers.clone()),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::try_parse_from(["tufe-server"]).expect("defaults parse");

        assert_eq!(config.bind, "0.0.0.0:8080".parse::<SocketAddr>().expect("addr"));
        assert_eq!(config.cache_ttl(), Duration::from_secs(21_600));
        assert_eq!(config.retries, 1);
        assert_eq!(config.sources, None);

        let router = config
            .router_builder(Arc::new(tufe_core::FixtureHttpClient::new()))
            .build();
        assert_eq!(router.config().candidate_timeout, Duration::from_secs(15));
        assert_eq!(router.config().supplementary_timeout, Duration::from_secs(5));
    }

    #[test]
    fn sources_are_validated() {
        let config = ServerConfig::try_parse_from(["tufe-server", "--sources", "tcmb-html,dbnomics"])
            .expect("known sources");
        assert_eq!(
            config.sources,
            Some(SourceList(vec![ProviderId::TcmbHtml, ProviderId::Dbnomics]))
        );

        assert!(ServerConfig::try_parse_from(["tufe-server", "--sources", "ecb"]).is_err());
    }
}
