// preview.rs: Show the payload an endpoint would receive for a phase.
//
// Format and log-line policy come from the job's first configured endpoint
// unless overridden on the command line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pn_dispatch::{build_state, Endpoint, FileRun, NotifyConfig};
use pn_model::{Phase, RunContext};
use pn_wire::{Format, Protocol};

#[derive(Args)]
pub struct PreviewArgs {
    /// Run description file (TOML).
    #[arg(long)]
    pub run: PathBuf,

    /// Lifecycle phase to render (started, completed, finished).
    #[arg(long)]
    pub phase: Phase,

    /// Payload format (json, xml).
    #[arg(long)]
    pub format: Option<Format>,

    /// Log lines to include (-1 = full log, 0 = none).
    #[arg(long, allow_hyphen_values = true)]
    pub log_lines: Option<i32>,
}

pub fn execute(args: &PreviewArgs, config: &NotifyConfig) -> anyhow::Result<()> {
    let run = FileRun::load(&args.run)
        .with_context(|| format!("Failed to load run {}", args.run.display()))?;

    let payload = render(&run, args.phase, config, args.format, args.log_lines)?;
    println!("{}", payload);
    Ok(())
}

/// Encode the `JobState` the dispatcher would build for this run.
fn render(
    run: &dyn RunContext,
    phase: Phase,
    config: &NotifyConfig,
    format: Option<Format>,
    log_lines: Option<i32>,
) -> anyhow::Result<String> {
    let mut endpoint = config
        .endpoints_for(run.job_name())
        .and_then(|endpoints| endpoints.first())
        .cloned()
        .unwrap_or_else(|| Endpoint::json(Protocol::Http, "http://localhost/"));
    if format.is_some() {
        endpoint.set_format(format);
    }
    if log_lines.is_some() {
        endpoint.set_log_lines(log_lines);
    }

    let state = build_state(phase, run, &endpoint, config.root_url.as_deref());
    let payload = endpoint.format().serialize(&state)?;
    Ok(String::from_utf8_lossy(&payload).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_model::{BuildResult, RunRecord};

    fn run() -> RunRecord {
        RunRecord::new("api", 5)
            .with_result(BuildResult::Success)
            .with_log("compile\ntest\n")
    }

    #[test]
    fn defaults_to_json_without_log() {
        let text = render(&run(), Phase::Completed, &NotifyConfig::default(), None, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["name"], "api");
        assert_eq!(value["build"]["phase"], "COMPLETED");
        assert_eq!(value["build"]["status"], "SUCCESS");
        assert_eq!(value["build"]["log"], "");
    }

    #[test]
    fn uses_first_configured_endpoint_settings() {
        let mut config = NotifyConfig::default();
        config.add_endpoints(
            "api",
            vec![Endpoint::new(Protocol::Tcp, "ci:9000", Some(Format::Xml), Some(1))],
        );

        let text = render(&run(), Phase::Finished, &config, None, None).unwrap();

        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<log>test"));
        assert!(!text.contains("compile"));
    }

    #[test]
    fn flags_override_configured_settings() {
        let mut config = NotifyConfig::default();
        config.add_endpoints(
            "api",
            vec![Endpoint::new(Protocol::Tcp, "ci:9000", Some(Format::Xml), Some(1))],
        );

        let text = render(&run(), Phase::Finished, &config, Some(Format::Json), Some(-1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["build"]["log"], "compile\ntest\n");
    }
}
