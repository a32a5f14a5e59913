use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use docqa_core::{build_query_request, BackendFailure, BackendRequest, Endpoint, Operation};
use docqa_engine::{Backend, BackendSettings, EngineEvent, EngineHandle};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct RecordingBackend {
    seen: Arc<Mutex<Vec<Endpoint>>>,
}

#[async_trait::async_trait]
impl Backend for RecordingBackend {
    async fn send(&self, request: &BackendRequest) -> Result<Value, BackendFailure> {
        self.seen.lock().unwrap().push(request.endpoint);
        match request.endpoint {
            Endpoint::Query => Ok(json!({ "result": { "answer": "42", "sources": [] } })),
            _ => Err(BackendFailure::Rejected {
                status: 400,
                detail: Some("Only .txt and .pdf files are supported.".to_string()),
            }),
        }
    }

    async fn health(&self) -> Result<String, BackendFailure> {
        Ok("API is online!".to_string())
    }
}

/// Tracks how many backend calls are running at once.
#[derive(Default)]
struct SlowBackend {
    running: AtomicUsize,
    peak: AtomicUsize,
}

struct RunningCall<'a>(&'a SlowBackend);

impl<'a> RunningCall<'a> {
    fn start(backend: &'a SlowBackend) -> Self {
        let now = backend.running.fetch_add(1, Ordering::SeqCst) + 1;
        backend.peak.fetch_max(now, Ordering::SeqCst);
        Self(backend)
    }
}

impl Drop for RunningCall<'_> {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Backend for SlowBackend {
    async fn send(&self, _request: &BackendRequest) -> Result<Value, BackendFailure> {
        let _call = RunningCall::start(self);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(json!({ "result": { "answer": "late", "sources": [] } }))
    }

    async fn health(&self) -> Result<String, BackendFailure> {
        let _call = RunningCall::start(self);
        tokio::time::sleep(Duration::from_millis(600)).await;
        Ok("API is online!".to_string())
    }
}

#[test]
fn completion_is_reported_with_its_operation() {
    let backend = Arc::new(RecordingBackend::default());
    let seen = backend.seen.clone();
    let (event_tx, event_rx) = mpsc::channel();
    let engine = EngineHandle::with_backend(backend, event_tx);

    engine.send(Operation::Query, build_query_request("meaning?").unwrap());

    let event = event_rx.recv_timeout(WAIT).expect("completion event");
    assert_eq!(
        event,
        EngineEvent::Completed {
            operation: Operation::Query,
            result: Ok(json!({ "result": { "answer": "42", "sources": [] } })),
        }
    );
    assert_eq!(*seen.lock().unwrap(), vec![Endpoint::Query]);
}

#[test]
fn health_check_returns_backend_status() {
    let (event_tx, _event_rx) = mpsc::channel();
    let engine = EngineHandle::with_backend(Arc::new(RecordingBackend::default()), event_tx);

    assert_eq!(engine.check_health(WAIT).unwrap(), "API is online!");
}

#[test]
fn timed_out_health_check_is_abandoned_before_next_send() {
    let backend = Arc::new(SlowBackend::default());
    let (event_tx, event_rx) = mpsc::channel();
    let engine = EngineHandle::with_backend(backend.clone(), event_tx);

    let outcome = engine.check_health(Duration::from_millis(50));
    assert!(matches!(outcome, Err(BackendFailure::Transport(_))));
    assert_eq!(backend.running.load(Ordering::SeqCst), 0);

    engine.send(Operation::Query, build_query_request("still there?").unwrap());
    let event = event_rx.recv_timeout(WAIT).expect("completion event");

    assert!(matches!(
        event,
        EngineEvent::Completed {
            operation: Operation::Query,
            result: Ok(_),
        }
    ));
    assert_eq!(backend.peak.load(Ordering::SeqCst), 1);
}

#[test]
fn engine_runs_requests_over_http() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process-text-input"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "detail": "index not built" })),
            )
            .mount(&server)
            .await;
        server
    });

    let (event_tx, event_rx) = mpsc::channel();
    let engine = EngineHandle::new(BackendSettings::with_base_url(server.uri()), event_tx)
        .expect("engine starts");
    let request =
        docqa_core::build_ingest_request(&docqa_core::DocumentInput::Text("doc".to_string()))
            .unwrap();

    engine.send(Operation::Ingest, request);

    let event = event_rx.recv_timeout(WAIT).expect("completion event");
    assert_eq!(
        event,
        EngineEvent::Completed {
            operation: Operation::Ingest,
            result: Err(BackendFailure::Rejected {
                status: 500,
                detail: Some("index not built".to_string()),
            }),
        }
    );
}
