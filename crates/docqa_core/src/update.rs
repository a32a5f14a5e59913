use crate::{
    build_ingest_request, build_query_request, decode_query_reply, AppState, Effect, Msg,
    Operation, WorkflowStatus, PROCESS_SUCCESS_TEXT,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            state.select_file(file);
            Vec::new()
        }
        Msg::TextEdited(text) => {
            state.edit_text(text);
            Vec::new()
        }
        Msg::QueryEdited(query) => {
            state.edit_query(query);
            Vec::new()
        }
        Msg::ProcessClicked => {
            // Single-flight: a submission while a call is outstanding is dropped.
            if state.is_busy() {
                return (state, Vec::new());
            }
            match build_ingest_request(state.input()) {
                Ok(request) => {
                    state.begin(Operation::Ingest);
                    vec![Effect::SendRequest {
                        operation: Operation::Ingest,
                        request,
                    }]
                }
                Err(err) => vec![Effect::Alert(err)],
            }
        }
        Msg::AskClicked => {
            // Blank questions are refused even while busy.
            let request = match build_query_request(state.query()) {
                Ok(request) => request,
                Err(err) => return (state, vec![Effect::Alert(err)]),
            };
            if state.is_busy() {
                return (state, Vec::new());
            }
            state.begin(Operation::Query);
            vec![Effect::SendRequest {
                operation: Operation::Query,
                request,
            }]
        }
        Msg::BackendReplied { operation, result } => {
            if state.in_flight() != Some(operation) {
                return (state, Vec::new());
            }
            match (operation, result) {
                (Operation::Ingest, Ok(_)) => {
                    state.finish(WorkflowStatus::Success(PROCESS_SUCCESS_TEXT.to_string()), None);
                }
                (Operation::Query, Ok(body)) => match decode_query_reply(body) {
                    Ok(result) => state.finish(WorkflowStatus::Idle, Some(result)),
                    Err(failure) => state.finish(
                        WorkflowStatus::Error(failure.status_message(operation)),
                        None,
                    ),
                },
                (_, Err(failure)) => state.finish(
                    WorkflowStatus::Error(failure.status_message(operation)),
                    None,
                ),
            }
            Vec::new()
        }
    };

    (state, effects)
}
