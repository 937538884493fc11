// http.rs: HTTP and HTTPS delivery.
//
// A notification is delivered once the exchange completes. The response
// status is logged but never turns a completed exchange into a failure;
// receivers that answer 4xx/5xx still count as reached.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::error::WireError;
use crate::protocol::{Protocol, SendOptions};

pub(crate) fn build_client(options: &SendOptions) -> Result<Client, WireError> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.timeout)
        .user_agent(concat!("phase-notifier/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(WireError::Client)
}

/// Resolve an endpoint URL for an HTTP-family protocol.
///
/// A URL without a scheme gets the protocol's scheme. Only `http` and
/// `https` schemes are accepted.
pub fn resolve_url(protocol: Protocol, url: &str) -> Result<Url, WireError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(WireError::InvalidUrl {
            url: url.to_string(),
            reason: "URL is empty".to_string(),
        });
    }

    let candidate = if url.contains("://") {
        url.to_string()
    } else {
        format!("{}://{}", protocol.scheme(), url)
    };

    let parsed = Url::parse(&candidate).map_err(|e| WireError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(WireError::InvalidUrl {
            url: url.to_string(),
            reason: format!("scheme '{}' cannot be used with {}", other, protocol),
        }),
    }
}

pub(crate) fn post(
    client: &Client,
    protocol: Protocol,
    url: &str,
    payload: &[u8],
    content_type: &str,
) -> Result<(), WireError> {
    let target = resolve_url(protocol, url)?;

    let response = client
        .post(target.clone())
        .header(CONTENT_TYPE, content_type)
        .body(payload.to_vec())
        .send()
        .map_err(|source| WireError::Http {
            url: target.to_string(),
            source,
        })?;

    let status = response.status();
    if status.is_success() {
        tracing::debug!("{} accepted notification ({})", target, status);
    } else {
        tracing::warn!(
            "{} answered {}; the notification was delivered but not accepted",
            target,
            status
        );
    }

    Ok(())
}
