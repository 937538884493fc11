// run.rs: what the host exposes about a running build.
//
// The host runtime owns the real run. The dispatcher only ever sees it
// through the `RunContext` trait, read-only, for the duration of one
// dispatch. `RunRecord` is an owned, in-memory implementation used by
// embedders that already have the data at hand (and by tests).

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The concluded result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SUCCESS" => Ok(BuildResult::Success),
            "UNSTABLE" => Ok(BuildResult::Unstable),
            "FAILURE" => Ok(BuildResult::Failure),
            "NOT_BUILT" => Ok(BuildResult::NotBuilt),
            "ABORTED" => Ok(BuildResult::Aborted),
            _ => Err(format!(
                "Invalid build result: '{}'. Valid results: success, unstable, failure, not_built, aborted",
                s
            )),
        }
    }
}

impl From<BuildResult> for String {
    fn from(result: BuildResult) -> Self {
        result.as_str().to_string()
    }
}

impl TryFrom<String> for BuildResult {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The value carried by a build parameter.
///
/// Each kind knows how it contributes to an environment-variable map;
/// some contribute several entries, some none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    String { value: String },
    Boolean { value: bool },
    /// Always treated as sensitive regardless of the parameter's flag.
    Password { value: String },
    /// An uploaded file; contributes its original file name.
    File { file_name: String },
    /// A reference to another job's run; expands to three entries.
    Run { job: String, number: u64 },
    /// A parameter with no environment contribution.
    Opaque,
}

/// A parameter declared on a run, with the host's sensitivity flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameter {
    pub name: String,

    #[serde(flatten)]
    pub kind: ParameterKind,

    #[serde(default)]
    pub sensitive: bool,
}

impl BuildParameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sensitive: false,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            ParameterKind::String {
                value: value.into(),
            },
        )
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, ParameterKind::Boolean { value })
    }

    pub fn password(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            ParameterKind::Password {
                value: value.into(),
            },
        )
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::new(
            name,
            ParameterKind::File {
                file_name: file_name.into(),
            },
        )
    }

    pub fn run(name: impl Into<String>, job: impl Into<String>, number: u64) -> Self {
        Self::new(
            name,
            ParameterKind::Run {
                job: job.into(),
                number,
            },
        )
    }

    /// Mark this parameter as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive || matches!(self.kind, ParameterKind::Password { .. })
    }

    /// Entries this parameter adds to an environment-variable map.
    ///
    /// Does not consult the sensitivity flag; filtering is the caller's job.
    pub fn env_entries(&self) -> Vec<(String, String)> {
        match &self.kind {
            ParameterKind::String { value } | ParameterKind::Password { value } => {
                vec![(self.name.clone(), value.clone())]
            }
            ParameterKind::Boolean { value } => vec![(self.name.clone(), value.to_string())],
            ParameterKind::File { file_name } => vec![(self.name.clone(), file_name.clone())],
            ParameterKind::Run { job, number } => vec![
                (self.name.clone(), format!("{}#{}", job, number)),
                (format!("{}_JOBNAME", self.name), job.clone()),
                (format!("{}_NUMBER", self.name), number.to_string()),
            ],
            ParameterKind::Opaque => Vec::new(),
        }
    }
}

/// Read-only view of a run, supplied by the host.
///
/// Implementations must be safe to read from several endpoint pipelines at
/// once; the dispatcher never mutates the run.
pub trait RunContext: Send + Sync {
    fn job_name(&self) -> &str;

    /// Job URL relative to the host root.
    fn job_url(&self) -> &str;

    fn number(&self) -> u64;

    /// Build URL relative to the host root.
    fn url(&self) -> &str;

    /// `None` while the run is still in progress.
    fn result(&self) -> Option<BuildResult>;

    fn display_name(&self) -> Option<&str> {
        None
    }

    /// The complete log text.
    fn log(&self) -> io::Result<String>;

    /// The last `max_lines` lines of the log, oldest first, without line
    /// terminators.
    fn log_tail(&self, max_lines: usize) -> io::Result<Vec<String>>;

    /// Declared parameters, or `None` if the run was not parameterized.
    fn parameters(&self) -> Option<&[BuildParameter]>;
}

/// Returns the last `max_lines` lines of `text`, oldest first.
pub fn tail_lines(text: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

/// An owned run held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub job_name: String,
    pub job_url: String,
    pub number: u64,
    pub url: String,

    #[serde(default)]
    pub result: Option<BuildResult>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub parameters: Option<Vec<BuildParameter>>,

    #[serde(default)]
    pub log: String,
}

impl RunRecord {
    /// A run of `job_name` with the host's conventional relative URLs
    /// (`job/<name>/` and `job/<name>/<number>/`).
    pub fn new(job_name: impl Into<String>, number: u64) -> Self {
        let job_name = job_name.into();
        Self {
            job_url: format!("job/{}/", job_name),
            url: format!("job/{}/{}/", job_name, number),
            job_name,
            number,
            result: None,
            display_name: None,
            parameters: None,
            log: String::new(),
        }
    }

    pub fn with_result(mut self, result: BuildResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = log.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<BuildParameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

impl RunContext for RunRecord {
    fn job_name(&self) -> &str {
        &self.job_name
    }

    fn job_url(&self) -> &str {
        &self.job_url
    }

    fn number(&self) -> u64 {
        self.number
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn result(&self) -> Option<BuildResult> {
        self.result
    }

    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    fn log(&self) -> io::Result<String> {
        Ok(self.log.clone())
    }

    fn log_tail(&self, max_lines: usize) -> io::Result<Vec<String>> {
        Ok(tail_lines(&self.log, max_lines))
    }

    fn parameters(&self) -> Option<&[BuildParameter]> {
        self.parameters.as_deref()
    }
}
