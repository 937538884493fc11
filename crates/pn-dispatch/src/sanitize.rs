// sanitize.rs: strip sensitive parameters before anything leaves the host.

use std::collections::BTreeMap;

use pn_model::{BuildParameter, RunContext};

/// Environment-shaped map of the run's non-sensitive parameters.
///
/// Returns `None` when the run carries no parameters at all, which is not
/// the same as a parameterized run whose parameters were all filtered out
/// (that yields an empty map).
pub fn sanitize(run: &dyn RunContext) -> Option<BTreeMap<String, String>> {
    run.parameters().map(sanitize_parameters)
}

/// Expand every non-sensitive parameter into its environment entries.
pub fn sanitize_parameters(parameters: &[BuildParameter]) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    for parameter in parameters {
        if parameter.is_sensitive() {
            tracing::debug!("dropping sensitive parameter {}", parameter.name);
            continue;
        }
        env.extend(parameter.env_entries());
    }
    env
}
