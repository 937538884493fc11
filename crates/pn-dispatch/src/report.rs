// report.rs: what happened to each endpoint during one dispatch.

use chrono::{DateTime, Utc};
use pn_model::Phase;
use uuid::Uuid;

use crate::error::DispatchError;

/// Outcome of notifying a single endpoint.
#[derive(Debug)]
pub struct EndpointOutcome {
    /// `PROTOCOL:url` label of the endpoint.
    pub endpoint: String,

    /// Bytes sent on success; the failure otherwise.
    pub result: Result<usize, DispatchError>,
}

impl EndpointOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-endpoint outcomes of one `handle` call, in configured order.
#[derive(Debug)]
pub struct DispatchReport {
    /// Correlates the log lines of this dispatch.
    pub dispatch_id: Uuid,
    pub phase: Phase,
    pub job: String,
    pub number: u64,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<EndpointOutcome>,
}

impl DispatchReport {
    pub fn new(phase: Phase, job: impl Into<String>, number: u64) -> Self {
        Self {
            dispatch_id: Uuid::new_v4(),
            phase,
            job: job.into(),
            number,
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    /// True when no endpoint was configured for the job.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EndpointOutcome> {
        self.outcomes.iter().filter(|o| !o.is_delivered())
    }

    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(EndpointOutcome::is_delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_delivered_and_failed() {
        let mut report = DispatchReport::new(Phase::Completed, "api", 3);
        assert!(report.is_empty());
        assert!(report.all_delivered());

        report.outcomes.push(EndpointOutcome {
            endpoint: "HTTP:http://a".to_string(),
            result: Ok(120),
        });
        report.outcomes.push(EndpointOutcome {
            endpoint: "TCP:b:1".to_string(),
            result: Err(DispatchError::Panicked {
                endpoint: "TCP:b:1".to_string(),
            }),
        });

        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.all_delivered());
    }
}
