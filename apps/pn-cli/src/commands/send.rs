// send.rs: Dispatch one phase for a run described by a file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pn_dispatch::{DispatchReport, Dispatcher, FileRun, NotifyConfig};
use pn_model::{BuildResult, Phase};

#[derive(Args)]
pub struct SendArgs {
    /// Lifecycle phase reached (started, completed, finished).
    #[arg(long)]
    pub phase: Phase,

    /// Run description file (TOML).
    #[arg(long)]
    pub run: PathBuf,

    /// Override the result recorded in the run file.
    #[arg(long)]
    pub result: Option<BuildResult>,
}

pub fn execute(args: &SendArgs, config: NotifyConfig) -> anyhow::Result<()> {
    let mut run = FileRun::load(&args.run)
        .with_context(|| format!("Failed to load run {}", args.run.display()))?;
    if args.result.is_some() {
        run.set_result(args.result);
    }

    let dispatcher = Dispatcher::new(config);
    let report = dispatcher.handle(args.phase, &run);

    print!("{}", render_report(&report));

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} endpoint(s) were not notified",
            failed,
            report.outcomes.len()
        );
    }
    Ok(())
}

/// One line per endpoint, in configured order.
fn render_report(report: &DispatchReport) -> String {
    if report.is_empty() {
        return format!(
            "No endpoints configured for job '{}'; nothing sent.\n",
            report.job
        );
    }

    let mut out = format!("{} {} #{}\n", report.phase, report.job, report.number);
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(bytes) => out.push_str(&format!("  ok    {} ({} bytes)\n", outcome.endpoint, bytes)),
            Err(e) => out.push_str(&format!("  FAIL  {}: {}\n", outcome.endpoint, e)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_dispatch::{DispatchError, EndpointOutcome};

    #[test]
    fn empty_report_says_nothing_was_sent() {
        let report = DispatchReport::new(Phase::Started, "api", 1);
        assert_eq!(
            render_report(&report),
            "No endpoints configured for job 'api'; nothing sent.\n"
        );
    }

    #[test]
    fn one_line_per_endpoint() {
        let mut report = DispatchReport::new(Phase::Completed, "api", 7);
        report.outcomes.push(EndpointOutcome {
            endpoint: "HTTP:http://hooks/build".to_string(),
            result: Ok(231),
        });
        report.outcomes.push(EndpointOutcome {
            endpoint: "TCP:ci:9000".to_string(),
            result: Err(DispatchError::Panicked {
                endpoint: "TCP:ci:9000".to_string(),
            }),
        });

        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "COMPLETED api #7");
        assert_eq!(lines[1], "  ok    HTTP:http://hooks/build (231 bytes)");
        assert!(lines[2].starts_with("  FAIL  TCP:ci:9000: "));
        assert_eq!(lines.len(), 3);
    }
}
