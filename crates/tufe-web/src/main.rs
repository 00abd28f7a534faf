use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tufe_core::{MemoryCache, ReqwestHttpClient};
use tufe_web::{app, telemetry, AppState, ServerConfig, ServerError, LATEST_PATH};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::parse();
    telemetry::init_tracing(&config.log_filter, config.log_json)?;

    let router = config
        .router_builder(Arc::new(ReqwestHttpClient::new()))
        .build();
    tracing::info!(
        candidates = ?router.candidates().iter().map(|c| c.provider.as_str()).collect::<Vec<_>>(),
        candidate_timeout_ms = config.candidate_timeout_ms,
        retries = config.retries,
        "source router ready"
    );

    let state = AppState::with_ttl(Arc::new(router), Arc::new(MemoryCache::new()), config.cache_ttl());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    tracing::info!(addr = %config.bind, path = LATEST_PATH, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
