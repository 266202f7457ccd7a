//! Candidate sources
//!
//! A [`CandidateSource`] produces one candidate list per call. The returned
//! future owns everything it needs (`'static`), so the query controller can
//! create it synchronously when a request is issued and hand it to a task.

use std::future::Future;

use lookup_core::{Candidate, LookupError, Result};

/// Something that can fetch the full candidate list
pub trait CandidateSource: Send + Sync + 'static {
    /// Start fetching the candidate list
    fn fetch(&self) -> impl Future<Output = Result<Vec<Candidate>>> + Send + 'static;
}

/// Decode a response body into candidates
///
/// Anything other than a JSON array of `{ id, name, email }` records is a
/// [`LookupError::Malformed`] payload.
pub fn decode_candidates(body: &[u8]) -> Result<Vec<Candidate>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    if !value.is_array() {
        return Err(LookupError::Malformed(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| LookupError::Malformed(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
