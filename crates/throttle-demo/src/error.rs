use thiserror::Error;
use throttle_core::ConfigError;

/// Errors surfaced by the demo server and client.
///
/// Per-request transport failures in the client are logged and counted, not
/// returned through this type.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid throttle configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
