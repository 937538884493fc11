// config.rs: notification configuration.
//
// Loaded from `.pn/notify.toml` in the project root:
//
//   root_url = "https://ci.example.com/"
//   mode = "concurrent"
//   timeout_secs = 20
//
//   [[jobs]]
//   name = "api"
//
//   [[jobs.endpoints]]
//   protocol = "HTTP"
//   url = "http://hooks.example.com/build"
//   format = "XML"
//   log_lines = 50
//
// The root URL is configuration rather than something looked up from the
// host at dispatch time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pn_wire::SendOptions;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::DispatchError;

/// How the endpoints of one dispatch are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One endpoint after another, in configured order.
    #[default]
    Sequential,
    /// One thread per endpoint; all are joined before the dispatch returns.
    Concurrent,
}

/// The endpoints configured for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNotifications {
    /// Job name, matched exactly against the run's job name.
    pub name: String,

    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Top-level notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Host root URL; when set, snapshots carry `fullUrl = root_url + run url`.
    #[serde(default)]
    pub root_url: Option<String>,

    #[serde(default)]
    pub mode: DispatchMode,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound on one send, so a hung endpoint cannot hold up the rest.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub jobs: Vec<JobNotifications>,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            root_url: None,
            mode: DispatchMode::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            jobs: Vec::new(),
        }
    }
}

impl NotifyConfig {
    /// Standard config location for a project: `<root>/.pn/notify.toml`.
    pub fn default_path(project_root: impl AsRef<Path>) -> PathBuf {
        project_root.as_ref().join(".pn").join("notify.toml")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DispatchError> {
        let content = std::fs::read_to_string(path).map_err(|source| DispatchError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| DispatchError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, or an empty one if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, DispatchError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no notification config at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Parse a JSON endpoint list, as exported by tools that store
    /// endpoints alongside other job settings.
    pub fn endpoints_from_json(json: &str) -> Result<Vec<Endpoint>, DispatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Endpoints configured for `job_name`, or `None` if the job has no
    /// notification settings.
    pub fn endpoints_for(&self, job_name: &str) -> Option<&[Endpoint]> {
        self.jobs
            .iter()
            .find(|job| job.name == job_name)
            .map(|job| job.endpoints.as_slice())
    }

    /// Add endpoints for a job, creating its entry if needed.
    pub fn add_endpoints(&mut self, job_name: &str, endpoints: Vec<Endpoint>) {
        match self.jobs.iter_mut().find(|job| job.name == job_name) {
            Some(job) => job.endpoints.extend(endpoints),
            None => self.jobs.push(JobNotifications {
                name: job_name.to_string(),
                endpoints,
            }),
        }
    }

    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn endpoint_count(&self) -> usize {
        self.jobs.iter().map(|job| job.endpoints.len()).sum()
    }

    /// Validate the configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.connect_timeout_secs == 0 {
            warnings.push("connect_timeout_secs is 0; every connection will time out".to_string());
        }
        if self.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; every send will time out".to_string());
        }

        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.name.as_str()) {
                warnings.push(format!(
                    "Job '{}' is configured more than once; only the first entry is used",
                    job.name
                ));
            }
            if job.endpoints.is_empty() {
                warnings.push(format!("Job '{}' has no endpoints", job.name));
            }
            for endpoint in &job.endpoints {
                warnings.extend(
                    endpoint
                        .validate()
                        .into_iter()
                        .map(|w| format!("Job '{}': {}", job.name, w)),
                );
            }
        }

        warnings
    }
}
