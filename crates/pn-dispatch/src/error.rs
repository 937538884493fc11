// error.rs: error types for configuration loading and dispatch.

use std::path::PathBuf;

use pn_wire::WireError;
use thiserror::Error;

/// Errors that can occur while loading configuration or notifying an
/// endpoint.
///
/// Endpoint-level variants never escape `Dispatcher::handle`; they are
/// logged and recorded in the dispatch report.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A configuration or run file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A TOML file did not match the expected layout.
    #[error("failed to parse {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A JSON endpoint list did not match the expected layout.
    #[error("invalid endpoint JSON: {0}")]
    EndpointJson(#[from] serde_json::Error),

    /// Encoding or delivery failed for one endpoint.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// An endpoint pipeline panicked while running on its own thread.
    #[error("notification to {endpoint} panicked")]
    Panicked { endpoint: String },
}
