use std::net::SocketAddr;

use thiserror::Error;

/// Startup and serve failures mapped to process exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Logging(_) => 3,
            Self::Bind { .. } => 4,
            Self::Io(_) => 10,
        }
    }
}
