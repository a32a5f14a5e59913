use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{Operation, QueryResult};

pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// Why a backend call did not produce a usable reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFailure {
    /// Non-2xx response. `detail` is the backend's `detail` field, if any.
    #[error("backend returned status {status}")]
    Rejected { status: u16, detail: Option<String> },
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// A 2xx response whose body does not match the contract.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendFailure {
    /// The text shown in the workflow status for this failure.
    pub fn status_message(&self, operation: Operation) -> String {
        let message = match self {
            BackendFailure::Rejected { detail, .. } => match detail.as_deref() {
                Some(detail) if !detail.trim().is_empty() => detail,
                _ => operation.failure_fallback(),
            },
            BackendFailure::Transport(description)
            | BackendFailure::MalformedResponse(description) => description,
        };
        // Blank means absent; anything else is shown exactly as received.
        if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message.to_string()
        }
    }
}

#[derive(Deserialize)]
struct QueryEnvelope {
    result: QueryResult,
}

/// Extracts `result.answer` and `result.sources` from a successful query
/// reply. Missing or mistyped fields are a failure, never empty values.
pub fn decode_query_reply(body: Value) -> Result<QueryResult, BackendFailure> {
    serde_json::from_value::<QueryEnvelope>(body)
        .map(|envelope| envelope.result)
        .map_err(|err| BackendFailure::MalformedResponse(format!("unexpected query reply: {err}")))
}
