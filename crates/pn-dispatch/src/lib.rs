//! # pn-dispatch
//!
//! The notification dispatch pipeline.
//!
//! For each lifecycle phase of a run the host calls [`Dispatcher::handle`],
//! which walks the endpoints configured for the run's job and, for each one
//! independently, runs:
//!
//! log policy → snapshot → parameter sanitizer → format → transport
//!
//! A failing endpoint is logged and recorded in the [`DispatchReport`]; it
//! never stops delivery to the others and never surfaces as an error from
//! `handle`.
//!
//! ## Key components
//!
//! - [`Endpoint`]: protocol, URL, format and log-line policy of one target
//! - [`NotifyConfig`]: per-job endpoint lists, root URL, timeouts, mode
//! - [`resolve_log`]: log-line policy
//! - [`sanitize`]: sensitive-parameter filter
//! - [`build_state`] / [`RunSnapshot`]: per-endpoint `JobState` construction
//! - [`Dispatcher`]: the phase entry point
//! - [`FileRun`]: a run described by a TOML file, for command-line use

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod file_run;
pub mod log_policy;
pub mod report;
pub mod sanitize;
pub mod snapshot;

pub use config::{DispatchMode, JobNotifications, NotifyConfig};
pub use dispatcher::Dispatcher;
pub use endpoint::{Endpoint, FULL_LOG};
pub use error::DispatchError;
pub use file_run::FileRun;
pub use log_policy::{resolve_log, LOG_UNAVAILABLE};
pub use report::{DispatchReport, EndpointOutcome};
pub use sanitize::{sanitize, sanitize_parameters};
pub use snapshot::{build_state, RunSnapshot};
