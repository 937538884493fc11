//! # pn-model
//!
//! Shared types for the phase notifier.
//!
//! ## Key components
//!
//! - [`Phase`]: the lifecycle points that trigger a notification
//!   (STARTED, COMPLETED, FINISHED)
//! - [`RunContext`]: the read-only view of a run the host supplies
//! - [`RunRecord`]: an owned, in-memory [`RunContext`]
//! - [`BuildParameter`]: a declared run parameter and its sensitivity flag
//! - [`JobState`] / [`BuildState`]: the per-endpoint snapshot that gets
//!   serialized and sent

pub mod phase;
pub mod run;
pub mod state;

pub use phase::Phase;
pub use run::{tail_lines, BuildParameter, BuildResult, ParameterKind, RunContext, RunRecord};
pub use state::{BuildState, JobState};
