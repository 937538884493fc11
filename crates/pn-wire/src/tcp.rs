// tcp.rs: raw TCP delivery.
//
// The endpoint URL is `host:port`, optionally prefixed with `tcp://`. The
// payload is written as-is with no framing; nothing is read back.

use std::fmt;
use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::error::WireError;
use crate::protocol::SendOptions;

/// Host and port of a TCP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpTarget {
    pub host: String,
    pub port: u16,
}

impl TcpTarget {
    pub fn parse(url: &str) -> Result<Self, WireError> {
        let invalid = |reason: &str| WireError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        let rest = match trimmed.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("tcp://") => &trimmed[6..],
            _ => trimmed,
        };
        let rest = rest.trim_end_matches('/');

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 address"))?;
            let port = after
                .strip_prefix(':')
                .ok_or_else(|| invalid("expected host:port"))?;
            (host, port)
        } else {
            rest.rsplit_once(':')
                .ok_or_else(|| invalid("expected host:port"))?
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| invalid("port is not a number between 1 and 65535"))?;
        if port == 0 {
            return Err(invalid("port 0 is not addressable"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, WireError> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| WireError::Resolve {
                target: self.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(WireError::Resolve {
                target: self.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses found",
                ),
            });
        }
        Ok(addrs)
    }
}

impl fmt::Display for TcpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

pub(crate) fn send(url: &str, payload: &[u8], options: &SendOptions) -> Result<(), WireError> {
    let target = TcpTarget::parse(url)?;
    let mut stream = connect(&target, options)?;

    stream
        .set_write_timeout(Some(options.timeout))
        .map_err(|source| WireError::Write {
            target: target.to_string(),
            source,
        })?;
    stream
        .write_all(payload)
        .and_then(|_| stream.flush())
        .map_err(|source| WireError::Write {
            target: target.to_string(),
            source,
        })?;

    // The peer may already have hung up; the payload is out either way.
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        tracing::debug!("shutdown of {} failed: {}", target, e);
    }
    Ok(())
}

fn connect(target: &TcpTarget, options: &SendOptions) -> Result<TcpStream, WireError> {
    let mut last_error = None;
    for addr in target.resolve()? {
        match TcpStream::connect_timeout(&addr, options.connect_timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(WireError::Connect {
        target: target.to_string(),
        source: last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to try")
        }),
    })
}
