use serde::Deserialize;

use crate::view_model::{AppViewModel, InputSummary, SourceExcerpt};
use crate::{DocumentInput, InputModeState};

pub const PROCESSING_TEXT: &str = "Processing document...";
pub const THINKING_TEXT: &str = "Thinking...";
pub const PROCESS_SUCCESS_TEXT: &str =
    "Document processed successfully! You can now ask a question.";

/// The two kinds of backend call the workflow can have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ingest,
    Query,
}

impl Operation {
    pub(crate) fn failure_fallback(&self) -> &'static str {
        match self {
            Operation::Ingest => "Failed to process document",
            Operation::Query => "Failed to get answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowStatus {
    #[default]
    Idle,
    Processing,
    Thinking,
    Error(String),
    Success(String),
}

impl WorkflowStatus {
    /// Status line text; empty means nothing is shown.
    pub fn text(&self) -> String {
        match self {
            WorkflowStatus::Idle => String::new(),
            WorkflowStatus::Processing => PROCESSING_TEXT.to_string(),
            WorkflowStatus::Thinking => THINKING_TEXT.to_string(),
            WorkflowStatus::Error(message) => format!("Error: {message}"),
            WorkflowStatus::Success(message) => message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<String>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty() && self.sources.is_empty()
    }
}

/// Everything the workflow controller owns. Only `update` mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: InputModeState,
    query: String,
    status: WorkflowStatus,
    result: QueryResult,
    in_flight: Option<Operation>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &DocumentInput {
        self.input.current_mode()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> &WorkflowStatus {
        &self.status
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns whether anything visible changed since the last call, and
    /// resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let busy = self.is_busy();
        let answer = (!self.result.answer.is_empty()).then(|| self.result.answer.clone());
        let sources = self
            .result
            .sources
            .iter()
            .enumerate()
            .map(|(index, text)| SourceExcerpt {
                ordinal: index + 1,
                text: text.clone(),
            })
            .collect();
        let input = match self.input.current_mode() {
            DocumentInput::None => InputSummary::Nothing,
            DocumentInput::File(file) => InputSummary::File {
                filename: file.filename.clone(),
                bytes: file.bytes.len(),
            },
            DocumentInput::Text(text) => InputSummary::Text {
                chars: text.chars().count(),
                blank: text.trim().is_empty(),
            },
        };

        AppViewModel {
            status_text: self.status.text(),
            answer,
            sources,
            busy,
            input,
            query: self.query.clone(),
            process_label: if busy { "Processing..." } else { "Process Document" },
            ask_label: if busy { "Thinking..." } else { "Ask Question" },
        }
    }

    pub(crate) fn select_file(&mut self, file: crate::UploadedFile) {
        self.input.set_file(file);
        self.dirty = true;
    }

    pub(crate) fn edit_text(&mut self, text: String) {
        self.input.set_text(text);
        self.dirty = true;
    }

    pub(crate) fn edit_query(&mut self, query: String) {
        if self.query != query {
            self.query = query;
            self.dirty = true;
        }
    }

    pub(crate) fn begin(&mut self, operation: Operation) {
        self.in_flight = Some(operation);
        self.status = match operation {
            Operation::Ingest => WorkflowStatus::Processing,
            Operation::Query => {
                self.result = QueryResult::default();
                WorkflowStatus::Thinking
            }
        };
        self.dirty = true;
    }

    pub(crate) fn finish(&mut self, status: WorkflowStatus, result: Option<QueryResult>) {
        self.in_flight = None;
        self.status = status;
        if let Some(result) = result {
            self.result = result;
        }
        self.dirty = true;
    }
}
