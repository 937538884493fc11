//! format: Payload encodings for notifications.
//!
//! Each endpoint names the format its receiver expects:
//! - **JSON**: camelCase object, absent fields omitted (the default)
//! - **XML**: `<jobState>` document with one element per field

use std::fmt;
use std::str::FromStr;

use pn_model::JobState;
use serde::{Deserialize, Serialize};

use crate::error::WireError;

pub mod json;
pub mod xml;

/// Wire format of a notification payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub fn all() -> &'static [Format] {
        &[Format::Json, Format::Xml]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Xml => "XML",
        }
    }

    /// MIME type sent with HTTP deliveries.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
        }
    }

    /// Encode a snapshot into the bytes sent to the endpoint.
    pub fn serialize(&self, state: &JobState) -> Result<Vec<u8>, WireError> {
        match self {
            Format::Json => json::encode(state),
            Format::Xml => xml::encode(state),
        }
    }

    /// Decode a payload produced by [`Format::serialize`].
    pub fn deserialize(&self, payload: &[u8]) -> Result<JobState, WireError> {
        match self {
            Format::Json => json::decode(payload),
            Format::Xml => xml::decode(payload),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            _ => Err(format!(
                "Invalid format: '{}'. Valid formats: json, xml",
                s
            )),
        }
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.as_str().to_string()
    }
}

impl TryFrom<String> for Format {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
