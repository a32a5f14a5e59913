use crate::{BackendRequest, Operation, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tell the user synchronously that a submission was refused.
    Alert(ValidationError),
    /// Issue exactly one backend call for the outstanding operation.
    SendRequest {
        operation: Operation,
        request: BackendRequest,
    },
}
