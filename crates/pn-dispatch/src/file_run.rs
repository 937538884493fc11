// file_run.rs: a run described by a TOML file, with its log on disk.
//
// Lets a shell step or an external scheduler fire notifications without
// embedding the library:
//
//   job_name = "api"
//   job_url = "job/api/"
//   number = 42
//   url = "job/api/42/"
//   result = "SUCCESS"
//   log_file = "console.log"      # relative to this file
//
//   [[parameters]]
//   name = "BRANCH"
//   type = "string"
//   value = "main"
//
// The log file is read on demand, once per endpoint that wants log text,
// so a missing log only degrades those notifications.

use std::io;
use std::path::{Path, PathBuf};

use pn_model::{tail_lines, BuildParameter, BuildResult, RunContext, RunRecord};
use serde::Deserialize;

use crate::error::DispatchError;

#[derive(Debug, Deserialize)]
struct RunFile {
    #[serde(flatten)]
    run: RunRecord,

    #[serde(default)]
    log_file: Option<PathBuf>,
}

/// A [`RunContext`] loaded from a run description file.
#[derive(Debug, Clone)]
pub struct FileRun {
    run: RunRecord,
    log_file: Option<PathBuf>,
}

impl FileRun {
    /// Load a run description. A relative `log_file` is resolved against
    /// the description's directory.
    pub fn load(path: &Path) -> Result<Self, DispatchError> {
        let content = std::fs::read_to_string(path).map_err(|source| DispatchError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RunFile = toml::from_str(&content).map_err(|source| DispatchError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let log_file = file.log_file.map(|log| {
            if log.is_absolute() {
                log
            } else {
                base.join(log)
            }
        });

        Ok(Self {
            run: file.run,
            log_file,
        })
    }

    pub fn record(&self) -> &RunRecord {
        &self.run
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Override the recorded result (e.g. from a command-line flag).
    pub fn set_result(&mut self, result: Option<BuildResult>) {
        self.run.result = result;
    }
}

impl RunContext for FileRun {
    fn job_name(&self) -> &str {
        &self.run.job_name
    }

    fn job_url(&self) -> &str {
        &self.run.job_url
    }

    fn number(&self) -> u64 {
        self.run.number
    }

    fn url(&self) -> &str {
        &self.run.url
    }

    fn result(&self) -> Option<BuildResult> {
        self.run.result
    }

    fn display_name(&self) -> Option<&str> {
        self.run.display_name.as_deref()
    }

    fn log(&self) -> io::Result<String> {
        match &self.log_file {
            Some(path) => std::fs::read_to_string(path),
            None => Ok(self.run.log.clone()),
        }
    }

    fn log_tail(&self, max_lines: usize) -> io::Result<Vec<String>> {
        Ok(tail_lines(&self.log()?, max_lines))
    }

    fn parameters(&self) -> Option<&[BuildParameter]> {
        self.run.parameters.as_deref()
    }
}
