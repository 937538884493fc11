// protocol.rs: transports a notification can travel over.
//
// `Transport` owns the pieces that are worth reusing across sends (the HTTP
// client and the timeouts) and routes each send by protocol. Sends are
// never retried here; a failure goes straight back to the caller.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::{http, tcp};

/// Transport protocol of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    Http,
    Https,
    /// Raw stream to `host:port`; the payload is written and the socket closed.
    Tcp,
}

impl Protocol {
    pub fn all() -> &'static [Protocol] {
        &[Protocol::Http, Protocol::Https, Protocol::Tcp]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Tcp => "TCP",
        }
    }

    /// URL scheme assumed when an endpoint URL omits one.
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Tcp => "tcp",
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Protocol::Http | Protocol::Https)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "tcp" => Ok(Protocol::Tcp),
            _ => Err(format!(
                "Invalid protocol: '{}'. Valid protocols: http, https, tcp",
                s
            )),
        }
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.as_str().to_string()
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Time limits applied to every send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Limit on establishing the connection.
    pub connect_timeout: Duration,
    /// Limit on the whole exchange (HTTP) or on each write (TCP).
    pub timeout: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends encoded payloads to endpoint URLs.
///
/// Safe to share between threads; one instance serves every endpoint of a
/// dispatch.
pub struct Transport {
    http: reqwest::blocking::Client,
    options: SendOptions,
}

impl Transport {
    pub fn new(options: SendOptions) -> Result<Self, WireError> {
        Ok(Self {
            http: http::build_client(&options)?,
            options,
        })
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    /// Deliver `payload` to `url` over `protocol`.
    ///
    /// `content_type` is only used by the HTTP transports.
    pub fn send(
        &self,
        protocol: Protocol,
        url: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<(), WireError> {
        tracing::debug!(
            "sending {} bytes to {}:{}",
            payload.len(),
            protocol,
            url
        );
        match protocol {
            Protocol::Http | Protocol::Https => {
                http::post(&self.http, protocol, url, payload, content_type)
            }
            Protocol::Tcp => tcp::send(url, payload, &self.options),
        }
    }
}
