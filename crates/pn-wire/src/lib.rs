//! # pn-wire
//!
//! Encoding and delivery of build notifications.
//!
//! - [`Format`]: closed set of payload encodings (JSON, XML); each variant
//!   knows how to serialize a [`pn_model::JobState`]
//! - [`Protocol`]: closed set of transports (HTTP, HTTPS, TCP)
//! - [`Transport`]: sends a payload to a URL over a protocol, bounded by
//!   [`SendOptions`]; never retries

pub mod error;
pub mod format;
pub mod http;
pub mod protocol;
pub mod tcp;

pub use error::WireError;
pub use format::Format;
pub use protocol::{Protocol, SendOptions, Transport};
pub use tcp::TcpTarget;
