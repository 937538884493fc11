// dispatcher.rs: fan one lifecycle phase out to every configured endpoint.
//
// The host calls `handle` exactly once per phase of a run, from whatever
// thread it likes, including an async runtime worker. Each endpoint gets its
// own snapshot (log text depends on the endpoint), its own encoding and its
// own send, all on a scoped thread of its own: the blocking HTTP client is
// never created, used or dropped on the caller's thread, and a panicking
// pipeline is reported against its endpoint instead of unwinding into the
// host. A failure is logged and the next endpoint is tried; `handle` itself
// never fails.

use std::thread;

use pn_model::{Phase, RunContext};
use pn_wire::{SendOptions, Transport};

use crate::config::{DispatchMode, NotifyConfig};
use crate::endpoint::Endpoint;
use crate::error::DispatchError;
use crate::log_policy::resolve_log;
use crate::report::{DispatchReport, EndpointOutcome};
use crate::snapshot::RunSnapshot;

/// Entry point for phase notifications.
pub struct Dispatcher {
    config: NotifyConfig,
    options: SendOptions,
}

impl Dispatcher {
    pub fn new(config: NotifyConfig) -> Self {
        let options = config.send_options();
        Self { config, options }
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Notify every endpoint configured for the run's job that `phase` was
    /// reached.
    ///
    /// Endpoints are attempted in configured order (or all at once in
    /// concurrent mode); the call returns once every endpoint has been
    /// attempted. Failures are reported, never propagated.
    pub fn handle(&self, phase: Phase, run: &dyn RunContext) -> DispatchReport {
        let mut report = DispatchReport::new(phase, run.job_name(), run.number());

        let endpoints = match self.config.endpoints_for(run.job_name()) {
            Some(endpoints) if !endpoints.is_empty() => endpoints,
            _ => {
                tracing::debug!("no endpoints configured for job {}", run.job_name());
                return report;
            }
        };

        let snapshot = RunSnapshot::capture(run, self.config.root_url.as_deref());
        tracing::info!(
            "dispatch {}: {} {} #{} to {} endpoint(s)",
            report.dispatch_id,
            phase,
            snapshot.job_name,
            snapshot.number,
            endpoints.len()
        );

        let results = self.notify_all(phase, run, &snapshot, endpoints);

        for (endpoint, result) in endpoints.iter().zip(results) {
            match &result {
                Ok(bytes) => tracing::debug!("notified {} ({} bytes)", endpoint, bytes),
                Err(e) => tracing::warn!("Failed to notify {}: {}", endpoint, e),
            }
            report.outcomes.push(EndpointOutcome {
                endpoint: endpoint.to_string(),
                result,
            });
        }

        tracing::info!(
            "dispatch {}: {}/{} endpoint(s) notified",
            report.dispatch_id,
            report.delivered(),
            report.outcomes.len()
        );
        report
    }

    /// Run every endpoint pipeline on its own scoped thread. Sequential mode
    /// joins each thread before starting the next; concurrent mode starts
    /// them all, then joins. Results come back in endpoint order.
    fn notify_all(
        &self,
        phase: Phase,
        run: &dyn RunContext,
        snapshot: &RunSnapshot,
        endpoints: &[Endpoint],
    ) -> Vec<Result<usize, DispatchError>> {
        thread::scope(|scope| match self.config.mode {
            DispatchMode::Sequential => endpoints
                .iter()
                .map(|endpoint| {
                    let handle = scope.spawn(move || self.notify(phase, run, snapshot, endpoint));
                    joined(handle, endpoint)
                })
                .collect(),
            DispatchMode::Concurrent => {
                let handles: Vec<_> = endpoints
                    .iter()
                    .map(|endpoint| scope.spawn(move || self.notify(phase, run, snapshot, endpoint)))
                    .collect();
                handles
                    .into_iter()
                    .zip(endpoints)
                    .map(|(handle, endpoint)| joined(handle, endpoint))
                    .collect()
            }
        })
    }

    /// Snapshot, encode and send for a single endpoint.
    fn notify(
        &self,
        phase: Phase,
        run: &dyn RunContext,
        snapshot: &RunSnapshot,
        endpoint: &Endpoint,
    ) -> Result<usize, DispatchError> {
        let state = snapshot.job_state(phase, resolve_log(run, endpoint.log_lines()));
        let format = endpoint.format();
        let payload = format.serialize(&state)?;

        Transport::new(self.options)?.send(
            endpoint.protocol(),
            endpoint.url(),
            &payload,
            format.content_type(),
        )?;
        Ok(payload.len())
    }
}

/// Join an endpoint's thread, turning a panic into that endpoint's failure.
fn joined(
    handle: thread::ScopedJoinHandle<'_, Result<usize, DispatchError>>,
    endpoint: &Endpoint,
) -> Result<usize, DispatchError> {
    handle.join().unwrap_or_else(|_| {
        Err(DispatchError::Panicked {
            endpoint: endpoint.to_string(),
        })
    })
}
