// endpoint.rs: one configured notification target.
//
// An endpoint pairs a transport and URL with the payload format its
// receiver expects and the amount of build log it wants. Endpoints are
// read-only while a dispatch is running.

use std::fmt;

use pn_wire::{Format, Protocol, TcpTarget};
use serde::{Deserialize, Deserializer, Serialize};

/// Log-line value meaning "send the complete log".
pub const FULL_LOG: i32 = -1;

/// A notification target.
///
/// `format` and `log_lines` are never absent: a missing or `null` format
/// reads as JSON and a missing or `null` line count reads as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    protocol: Protocol,

    url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    format: Format,

    /// -1 for the full log, 0 for none, N for the last N lines.
    #[serde(
        default,
        alias = "logLines",
        alias = "loglines",
        deserialize_with = "null_as_default"
    )]
    log_lines: i32,
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Endpoint {
    pub fn new(
        protocol: Protocol,
        url: impl Into<String>,
        format: Option<Format>,
        log_lines: Option<i32>,
    ) -> Self {
        Self {
            protocol,
            url: url.into(),
            format: format.unwrap_or_default(),
            log_lines: log_lines.unwrap_or(0),
        }
    }

    /// A JSON endpoint that receives no log.
    pub fn json(protocol: Protocol, url: impl Into<String>) -> Self {
        Self::new(protocol, url, None, None)
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// `None` resets the format to JSON.
    pub fn set_format(&mut self, format: Option<Format>) {
        self.format = format.unwrap_or_default();
    }

    pub fn log_lines(&self) -> i32 {
        self.log_lines
    }

    /// `None` resets the line count to 0.
    pub fn set_log_lines(&mut self, log_lines: Option<i32>) {
        self.log_lines = log_lines.unwrap_or(0);
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_log_lines(mut self, log_lines: i32) -> Self {
        self.log_lines = log_lines;
        self
    }

    /// Check this endpoint for configuration mistakes.
    ///
    /// Returns warnings rather than errors: a bad endpoint only fails its
    /// own deliveries.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.url.trim().is_empty() {
            warnings.push(format!("Endpoint {} has an empty URL", self));
            return warnings;
        }

        match self.protocol {
            Protocol::Tcp => {
                if let Err(e) = TcpTarget::parse(&self.url) {
                    warnings.push(format!("Endpoint {}: {}", self, e));
                }
            }
            Protocol::Http | Protocol::Https => {
                if let Err(e) = pn_wire::http::resolve_url(self.protocol, &self.url) {
                    warnings.push(format!("Endpoint {}: {}", self, e));
                }
            }
        }

        if self.log_lines < FULL_LOG {
            warnings.push(format!(
                "Endpoint {} has log_lines = {}; values below -1 send no log",
                self, self.log_lines
            ));
        }

        warnings
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.protocol, self.url)
    }
}
