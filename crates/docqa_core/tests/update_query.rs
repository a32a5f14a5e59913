use docqa_core::{
    update, AppState, BackendFailure, Effect, Endpoint, Msg, Operation, QueryResult,
    RequestBody, SourceExcerpt, ValidationError, WorkflowStatus,
};
use serde_json::json;

fn init_logging() {
    docqa_logging::initialize_for_tests();
}

fn ask(state: AppState, query: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::QueryEdited(query.to_string()));
    update(state, Msg::AskClicked)
}

fn reply(state: AppState, result: Result<serde_json::Value, BackendFailure>) -> AppState {
    let (state, effects) = update(
        state,
        Msg::BackendReplied {
            operation: Operation::Query,
            result,
        },
    );
    assert!(effects.is_empty());
    state
}

fn answered(answer: &str, sources: &[&str]) -> AppState {
    let (state, _) = ask(AppState::new(), "first question");
    reply(
        state,
        Ok(json!({ "result": { "answer": answer, "sources": sources } })),
    )
}

#[test]
fn blank_query_alerts_without_touching_state() {
    init_logging();
    let state = answered("Earlier answer.", &["earlier source"]);
    let (state, _) = update(state, Msg::QueryEdited("   ".to_string()));
    let before = state.clone();

    let (next, effects) = update(state, Msg::AskClicked);

    assert_eq!(effects, vec![Effect::Alert(ValidationError::EmptyQuery)]);
    assert_eq!(next, before);
    assert_eq!(next.result().answer, "Earlier answer.");
}

#[test]
fn ask_clears_previous_result_and_shows_thinking() {
    init_logging();
    let state = answered("Earlier answer.", &["earlier source"]);

    let (state, effects) = ask(state, "What is the capital?");

    assert_eq!(state.status(), &WorkflowStatus::Thinking);
    assert_eq!(state.view().status_text, "Thinking...");
    assert_eq!(state.result(), &QueryResult::default());
    assert_eq!(state.in_flight(), Some(Operation::Query));
    match effects.as_slice() {
        [Effect::SendRequest { operation, request }] => {
            assert_eq!(*operation, Operation::Query);
            assert_eq!(request.endpoint, Endpoint::Query);
            assert_eq!(
                request.body,
                RequestBody::Json(json!({ "query": "What is the capital?" }))
            );
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn successful_reply_preserves_answer_and_source_order() {
    init_logging();
    let (state, _) = ask(AppState::new(), "What is the capital?");
    let state = reply(
        state,
        Ok(json!({
            "status": "success",
            "result": {
                "answer": "Paris is the capital.",
                "sources": ["doc1 excerpt", "doc2 excerpt"]
            }
        })),
    );

    assert_eq!(state.result().answer, "Paris is the capital.");
    assert_eq!(
        state.result().sources,
        vec!["doc1 excerpt".to_string(), "doc2 excerpt".to_string()]
    );
    assert_eq!(state.status(), &WorkflowStatus::Idle);
    assert!(!state.is_busy());

    let view = state.view();
    assert_eq!(view.status_text, "");
    assert_eq!(view.answer.as_deref(), Some("Paris is the capital."));
    assert_eq!(
        view.sources,
        vec![
            SourceExcerpt {
                ordinal: 1,
                text: "doc1 excerpt".to_string()
            },
            SourceExcerpt {
                ordinal: 2,
                text: "doc2 excerpt".to_string()
            },
        ]
    );
}

#[test]
fn failed_query_leaves_result_empty() {
    init_logging();
    let state = answered("Earlier answer.", &[]);
    let (state, _) = ask(state, "Again?");
    let state = reply(
        state,
        Err(BackendFailure::Rejected {
            status: 400,
            detail: Some("Query field cannot be empty.".to_string()),
        }),
    );

    assert_eq!(
        state.status(),
        &WorkflowStatus::Error("Query field cannot be empty.".to_string())
    );
    assert!(state.result().is_empty());
    assert!(!state.is_busy());
}

#[test]
fn rejection_without_detail_uses_fallback_text() {
    init_logging();
    let (state, _) = ask(AppState::new(), "Anything?");
    let state = reply(
        state,
        Err(BackendFailure::Rejected {
            status: 503,
            detail: None,
        }),
    );

    assert_eq!(state.view().status_text, "Error: Failed to get answer");
}

#[test]
fn malformed_success_reply_is_an_error() {
    init_logging();
    let (state, _) = ask(AppState::new(), "Anything?");
    let state = reply(state, Ok(json!({ "status": "success" })));

    assert!(matches!(state.status(), WorkflowStatus::Error(_)));
    assert!(state.result().is_empty());
    assert!(!state.is_busy());
}

#[test]
fn second_ask_while_thinking_is_ignored() {
    init_logging();
    let (state, _) = ask(AppState::new(), "First?");
    let (state, _) = update(state, Msg::QueryEdited("Second?".to_string()));
    let before = state.clone();

    let (next, effects) = update(state, Msg::AskClicked);
    assert!(effects.is_empty());
    assert_eq!(next, before);

    let (next, effects) = update(next, Msg::ProcessClicked);
    assert!(effects.is_empty());
    assert_eq!(next.in_flight(), Some(Operation::Query));
}

#[test]
fn ask_is_accepted_again_after_completion() {
    init_logging();
    let state = answered("One.", &["a"]);
    let (state, effects) = ask(state, "Two?");

    assert_eq!(effects.len(), 1);
    assert!(state.is_busy());
}
