// snapshot.rs: build the JobState sent to one endpoint.
//
// Everything about the run except its log is the same for every endpoint,
// so a dispatch captures those fields once into a `RunSnapshot` and then
// stamps out one JobState per endpoint with that endpoint's log text.

use std::collections::BTreeMap;

use pn_model::{BuildState, JobState, Phase, RunContext};

use crate::endpoint::Endpoint;
use crate::log_policy::resolve_log;
use crate::sanitize::sanitize;

/// The endpoint-independent fields of a run, copied out of the host's
/// run context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub job_name: String,
    pub job_url: String,
    pub number: u64,
    pub url: String,
    pub status: Option<String>,
    pub full_url: Option<String>,
    pub display_name: Option<String>,
    pub parameters: Option<BTreeMap<String, String>>,
}

impl RunSnapshot {
    /// Copy the run's fields. `root_url` is the host's root URL, if one is
    /// configured.
    pub fn capture(run: &dyn RunContext, root_url: Option<&str>) -> Self {
        Self {
            job_name: run.job_name().to_string(),
            job_url: run.job_url().to_string(),
            number: run.number(),
            url: run.url().to_string(),
            status: run.result().map(|r| r.to_string()),
            full_url: root_url.map(|root| format!("{}{}", root, run.url())),
            display_name: run.display_name().map(str::to_string),
            parameters: sanitize(run),
        }
    }

    /// The JobState for one endpoint, carrying `log` as its log text.
    pub fn job_state(&self, phase: Phase, log: String) -> JobState {
        JobState {
            name: self.job_name.clone(),
            url: self.job_url.clone(),
            build: BuildState {
                full_url: self.full_url.clone(),
                number: self.number,
                phase,
                status: self.status.clone(),
                url: self.url.clone(),
                display_name: self.display_name.clone(),
                parameters: self.parameters.clone(),
                log,
            },
        }
    }
}

/// Build the snapshot for a single (phase, run, endpoint) triple.
pub fn build_state(
    phase: Phase,
    run: &dyn RunContext,
    endpoint: &Endpoint,
    root_url: Option<&str>,
) -> JobState {
    RunSnapshot::capture(run, root_url).job_state(phase, resolve_log(run, endpoint.log_lines()))
}
