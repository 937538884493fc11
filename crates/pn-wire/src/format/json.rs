//! json.rs: JSON payloads.

use pn_model::JobState;

use crate::error::WireError;

pub fn encode(state: &JobState) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(state)?)
}

pub fn decode(payload: &[u8]) -> Result<JobState, WireError> {
    Ok(serde_json::from_slice(payload)?)
}
