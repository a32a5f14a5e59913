use serde_json::{json, Value};
use thiserror::Error;

use crate::{DocumentInput, UploadedFile};

/// Multipart field name the backend reads the uploaded document from.
pub const FILE_FIELD: &str = "file";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no input provided")]
    NoInput,
    #[error("empty query")]
    EmptyQuery,
}

impl ValidationError {
    /// Prompt shown to the user when a submission is refused.
    pub fn hint(&self) -> &'static str {
        match self {
            ValidationError::NoInput => "Please select a file or paste some text.",
            ValidationError::EmptyQuery => "Please enter a query.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Multipart upload of a document file.
    ProcessFile,
    /// JSON submission of pasted text.
    ProcessText,
    Query,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ProcessFile => "/process-text",
            Endpoint::ProcessText => "/process-text-input",
            Endpoint::Query => "/query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Single-part multipart form; the transport chooses the boundary.
    Multipart {
        field: &'static str,
        file: UploadedFile,
    },
    Json(Value),
}

/// A fully described POST to the backend, independent of any HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub endpoint: Endpoint,
    pub body: RequestBody,
}

impl BackendRequest {
    /// Explicit content type, if the body needs one. Multipart is left to the
    /// transport so it can attach the boundary parameter.
    pub fn content_type(&self) -> Option<&'static str> {
        match self.body {
            RequestBody::Multipart { .. } => None,
            RequestBody::Json(_) => Some(JSON_CONTENT_TYPE),
        }
    }
}

pub fn build_ingest_request(input: &DocumentInput) -> Result<BackendRequest, ValidationError> {
    if input.is_blank() {
        return Err(ValidationError::NoInput);
    }
    let request = match input {
        DocumentInput::File(file) => BackendRequest {
            endpoint: Endpoint::ProcessFile,
            body: RequestBody::Multipart {
                field: FILE_FIELD,
                file: file.clone(),
            },
        },
        // Blank text was rejected above; the payload is sent as typed.
        DocumentInput::Text(text) => BackendRequest {
            endpoint: Endpoint::ProcessText,
            body: RequestBody::Json(json!({ "text": text })),
        },
        DocumentInput::None => return Err(ValidationError::NoInput),
    };
    Ok(request)
}

pub fn build_query_request(query: &str) -> Result<BackendRequest, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(BackendRequest {
        endpoint: Endpoint::Query,
        body: RequestBody::Json(json!({ "query": query })),
    })
}
