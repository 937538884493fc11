// phase.rs: the points in a build's lifecycle that trigger a notification.
//
// A phase is both a data field in the outgoing snapshot and the trigger the
// host fires. Each phase is dispatched independently: nothing links a
// STARTED notification to the later COMPLETED one except the build number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named point in a build's lifecycle.
///
/// Serializes as the upper-case name (`"STARTED"`) in every wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Phase {
    /// The build has been scheduled and begun executing.
    Started,
    /// The build steps have run and a result is known.
    Completed,
    /// All post-build work is done and the run is closed.
    Finished,
}

impl Phase {
    /// Returns all phases in lifecycle order.
    pub fn all() -> &'static [Phase] {
        &[Phase::Started, Phase::Completed, Phase::Finished]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Started => "STARTED",
            Phase::Completed => "COMPLETED",
            Phase::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STARTED" => Ok(Phase::Started),
            "COMPLETED" => Ok(Phase::Completed),
            "FINISHED" => Ok(Phase::Finished),
            _ => Err(format!(
                "Invalid phase: '{}'. Valid phases: started, completed, finished",
                s
            )),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl TryFrom<String> for Phase {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
