use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a document file to upload.
    FileSelected(crate::UploadedFile),
    /// User edited the pasted-text area.
    TextEdited(String),
    /// User edited the question box.
    QueryEdited(String),
    /// User clicked Process Document.
    ProcessClicked,
    /// User clicked Ask Question.
    AskClicked,
    /// Engine completion for the outstanding backend call.
    BackendReplied {
        operation: crate::Operation,
        result: Result<Value, crate::BackendFailure>,
    },
}
