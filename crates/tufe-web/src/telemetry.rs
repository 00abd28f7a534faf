use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ServerError;

/// Installs the global subscriber. `RUST_LOG` overrides `filter`.
pub fn init_tracing(filter: &str, json: bool) -> Result<(), ServerError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| ServerError::Logging(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    installed.map_err(|e| ServerError::Logging(e.to_string()))?;

    tracing::info!(filter, json, "tracing initialised");
    Ok(())
}
