// log_policy.rs: how much of the build log an endpoint receives.
//
//   -1      the complete log
//    0      nothing (no log read at all)
//    N > 0  the last N lines, each newline-terminated, oldest first
//   < -1    nothing, same as 0
//
// A failed log read is not fatal to the notification: the log text is
// replaced with a fixed placeholder.

use pn_model::RunContext;

use crate::endpoint::FULL_LOG;

/// Log text used when the host cannot supply the log.
pub const LOG_UNAVAILABLE: &str = "Unable to retrieve log";

/// Resolve the log text to include for an endpoint's `log_lines` setting.
pub fn resolve_log(run: &dyn RunContext, log_lines: i32) -> String {
    let result = match log_lines {
        FULL_LOG => run.log(),
        n if n > 0 => run.log_tail(n as usize).map(|lines| {
            let mut log = String::new();
            for line in lines {
                log.push_str(&line);
                log.push('\n');
            }
            log
        }),
        _ => return String::new(),
    };

    match result {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!(
                "could not read log of {} #{}: {}",
                run.job_name(),
                run.number(),
                e
            );
            LOG_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_model::{BuildParameter, BuildResult, RunRecord};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn run_with_log() -> RunRecord {
        RunRecord::new("api", 9).with_log("fetch\ncompile\ntest\npackage\n")
    }

    /// A run whose log can't be read, counting read attempts.
    struct BrokenLogRun {
        reads: AtomicUsize,
    }

    impl RunContext for BrokenLogRun {
        fn job_name(&self) -> &str {
            "api"
        }
        fn job_url(&self) -> &str {
            "job/api/"
        }
        fn number(&self) -> u64 {
            1
        }
        fn url(&self) -> &str {
            "job/api/1/"
        }
        fn result(&self) -> Option<BuildResult> {
            None
        }
        fn log(&self) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::NotFound, "log rotated away"))
        }
        fn log_tail(&self, _max_lines: usize) -> io::Result<Vec<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::NotFound, "log rotated away"))
        }
        fn parameters(&self) -> Option<&[BuildParameter]> {
            None
        }
    }

    #[test]
    fn full_log_for_minus_one() {
        assert_eq!(
            resolve_log(&run_with_log(), -1),
            "fetch\ncompile\ntest\npackage\n"
        );
    }

    #[test]
    fn empty_for_zero() {
        assert_eq!(resolve_log(&run_with_log(), 0), "");
    }

    #[test]
    fn last_line_for_one() {
        assert_eq!(resolve_log(&run_with_log(), 1), "package\n");
    }

    #[test]
    fn last_n_lines_in_order() {
        assert_eq!(resolve_log(&run_with_log(), 3), "compile\ntest\npackage\n");
    }

    #[test]
    fn more_lines_than_log_returns_everything() {
        assert_eq!(
            resolve_log(&run_with_log(), 100),
            "fetch\ncompile\ntest\npackage\n"
        );
    }

    #[test]
    fn other_negatives_mean_no_log() {
        for n in [-2, -10, i32::MIN] {
            assert_eq!(resolve_log(&run_with_log(), n), "", "log_lines = {}", n);
        }
    }

    #[test]
    fn unreadable_log_uses_placeholder() {
        let run = BrokenLogRun {
            reads: AtomicUsize::new(0),
        };
        assert_eq!(resolve_log(&run, -1), LOG_UNAVAILABLE);
        assert_eq!(resolve_log(&run, 5), LOG_UNAVAILABLE);
    }

    #[test]
    fn zero_never_reads_the_log() {
        let run = BrokenLogRun {
            reads: AtomicUsize::new(0),
        };
        assert_eq!(resolve_log(&run, 0), "");
        assert_eq!(resolve_log(&run, -2), "");
        assert_eq!(run.reads.load(Ordering::SeqCst), 0);
    }
}
