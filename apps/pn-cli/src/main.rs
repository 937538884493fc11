//! # pn-cli
//!
//! Command-line front end for build phase notifications:
//! - `pn send`: notify every endpoint of a job that a phase was reached
//! - `pn preview`: print the payload an endpoint would receive
//! - `pn check`: validate the notification config

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pn_dispatch::NotifyConfig;
use tracing_subscriber::EnvFilter;

/// Send build lifecycle notifications to configured endpoints.
#[derive(Parser)]
#[command(name = "pn", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Notification config (defaults to <project-root>/.pn/notify.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one phase of a run to its job's endpoints.
    Send(commands::send::SendArgs),
    /// Print the payload that would be sent, without sending it.
    Preview(commands::preview::PreviewArgs),
    /// Validate the notification config.
    Check,
}

/// Resolve and load the config. An explicit `--config` must exist; the
/// project default may be absent.
fn load_config(project_root: &Path, explicit: Option<&Path>) -> anyhow::Result<(PathBuf, NotifyConfig)> {
    match explicit {
        Some(path) => {
            let config = NotifyConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((path.to_path_buf(), config))
        }
        None => {
            let path = NotifyConfig::default_path(project_root);
            let config = NotifyConfig::load_or_default(&path)?;
            Ok((path, config))
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pn_dispatch=info".parse()?)
                .add_directive("pn_wire=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let (config_path, config) = load_config(&project_root, cli.config.as_deref())?;

    match &cli.command {
        Commands::Send(args) => commands::send::execute(args, config),
        Commands::Preview(args) => commands::preview::execute(args, &config),
        Commands::Check => commands::check::execute(&config_path, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_project_config_is_empty() {
        let dir = tempdir().unwrap();
        let (path, config) = load_config(dir.path(), None).unwrap();

        assert_eq!(path, dir.path().join(".pn").join("notify.toml"));
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("elsewhere.toml");
        assert!(load_config(dir.path(), Some(explicit.as_path())).is_err());
    }

    #[test]
    fn explicit_config_wins_over_project_default() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("notify.toml");
        std::fs::write(
            &explicit,
            "[[jobs]]\nname = \"api\"\n\n[[jobs.endpoints]]\nprotocol = \"HTTP\"\nurl = \"http://hooks/build\"\n",
        )
        .unwrap();

        let (path, config) = load_config(dir.path(), Some(explicit.as_path())).unwrap();

        assert_eq!(path, explicit);
        assert_eq!(config.endpoints_for("api").map(|e| e.len()), Some(1));
    }
}
