// state.rs: the point-in-time snapshot sent to every endpoint.
//
// A JobState is built fresh for each (phase, run, endpoint) triple, serialized
// once and then dropped. Nothing here is persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// The job a notification is about, with its current build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "jobState", rename_all = "camelCase")]
pub struct JobState {
    /// Job name as the host knows it.
    pub name: String,

    /// Job URL relative to the host root (e.g. `job/api/`).
    pub url: String,

    pub build: BuildState,
}

/// The build that triggered the notification.
///
/// Absent optional fields are omitted from every encoding rather than
/// written as empty values, so receivers can tell "no result yet" apart
/// from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildState {
    /// Absolute build URL; only present when the host has a root URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    pub number: u64,

    pub phase: Phase,

    /// Result name (`SUCCESS`, `FAILURE`, ...); absent until the run concludes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Build URL relative to the host root (e.g. `job/api/42/`).
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Non-sensitive build parameters in environment-variable form.
    /// Absent when the run was not parameterized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,

    /// Log text selected by the receiving endpoint's log-line policy.
    #[serde(default)]
    pub log: String,
}

impl BuildState {
    /// A bare build state with no result, parameters or log.
    pub fn new(number: u64, url: impl Into<String>, phase: Phase) -> Self {
        Self {
            full_url: None,
            number,
            phase,
            status: None,
            url: url.into(),
            display_name: None,
            parameters: None,
            log: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_job() -> JobState {
        JobState {
            name: "api".to_string(),
            url: "job/api/".to_string(),
            build: BuildState::new(7, "job/api/7/", Phase::Started),
        }
    }

    #[test]
    fn json_uses_camel_case_field_names() {
        let mut job = started_job();
        job.build.full_url = Some("https://ci.example.com/job/api/7/".to_string());
        job.build.display_name = Some("#7".to_string());

        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"fullUrl\""));
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"phase\":\"STARTED\""));
    }

    #[test]
    fn absent_fields_are_omitted() {
        let json = serde_json::to_value(started_job()).unwrap();
        let build = json["build"].as_object().unwrap();

        assert!(!build.contains_key("status"));
        assert!(!build.contains_key("fullUrl"));
        assert!(!build.contains_key("parameters"));
        assert_eq!(build["log"], "");
    }

    #[test]
    fn missing_optional_fields_deserialize_as_absent() {
        let json = r#"{"name":"api","url":"job/api/","build":{"number":3,"phase":"COMPLETED","url":"job/api/3/"}}"#;
        let job: JobState = serde_json::from_str(json).unwrap();

        assert_eq!(job.build.status, None);
        assert_eq!(job.build.parameters, None);
        assert_eq!(job.build.log, "");
    }
}
