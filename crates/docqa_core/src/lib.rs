//! docqa core: pure workflow state machine, request building and view-model helpers.
mod effect;
mod input;
mod msg;
mod reply;
mod request;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use input::{DocumentInput, InputModeState, UploadedFile};
pub use msg::Msg;
pub use reply::{decode_query_reply, BackendFailure, UNKNOWN_ERROR};
pub use request::{
    build_ingest_request, build_query_request, BackendRequest, Endpoint, RequestBody,
    ValidationError, FILE_FIELD, JSON_CONTENT_TYPE,
};
pub use state::{
    AppState, Operation, QueryResult, WorkflowStatus, PROCESSING_TEXT, PROCESS_SUCCESS_TEXT,
    THINKING_TEXT,
};
pub use update::update;
pub use view_model::{AppViewModel, InputSummary, SourceExcerpt};
