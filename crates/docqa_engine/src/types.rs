use docqa_core::{BackendFailure, Operation};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The backend call for `operation` resolved, successfully or not.
    Completed {
        operation: Operation,
        result: Result<Value, BackendFailure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid backend base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(String),
}
