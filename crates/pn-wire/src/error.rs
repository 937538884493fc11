// error.rs: error types for payload encoding and delivery.
//
// Every transport failure, whatever the protocol, surfaces as one of these
// so the dispatcher can report it uniformly against the endpoint.

use thiserror::Error;

/// Errors that can occur while encoding or sending a notification.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON encoding or decoding failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML encoding or decoding failed.
    #[error("XML serialization error: {0}")]
    Xml(String),

    /// The endpoint URL cannot be used with the chosen protocol.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The HTTP exchange did not complete (DNS, connect, reset, timeout).
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The TCP host name did not resolve to any address.
    #[error("could not resolve {target}: {source}")]
    Resolve {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// No resolved address accepted a TCP connection in time.
    #[error("could not connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection was established but writing the payload failed.
    #[error("failed to write payload to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },
}
