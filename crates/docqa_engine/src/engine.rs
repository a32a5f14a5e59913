use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docqa_core::{BackendFailure, BackendRequest, Operation};
use docqa_logging::{qa_error, qa_info, qa_warn};

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::{EngineEvent, SettingsError};

enum EngineCommand {
    Send {
        operation: Operation,
        request: BackendRequest,
    },
    CheckHealth {
        timeout: Duration,
        reply: mpsc::Sender<Result<String, BackendFailure>>,
    },
}

/// Runs backend calls on a background tokio runtime and reports each
/// completion on the event channel. It does not gate submissions; the
/// caller's state machine decides what may be sent.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        settings: BackendSettings,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, SettingsError> {
        let backend = ReqwestBackend::new(settings)?;
        Ok(Self::with_backend(Arc::new(backend), event_tx))
    }

    pub fn with_backend(backend: Arc<dyn Backend>, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let worker_events = event_tx.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    qa_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let backend = backend.clone();
                let event_tx = worker_events.clone();
                runtime.spawn(async move {
                    handle_command(backend.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_tx }
    }

    pub fn send(&self, operation: Operation, request: BackendRequest) {
        qa_info!(
            "Dispatching {:?} to {}",
            operation,
            request.endpoint.path()
        );
        if self
            .cmd_tx
            .send(EngineCommand::Send { operation, request })
            .is_err()
        {
            // The worker is gone; report a failure so the caller is not left busy.
            qa_error!("Engine worker unavailable; failing {:?}", operation);
            let _ = self.event_tx.send(EngineEvent::Completed {
                operation,
                result: Err(BackendFailure::Transport(
                    "request engine is not running".to_string(),
                )),
            });
        }
    }

    /// Asks the backend for its status, giving up after `timeout`. The limit
    /// is applied on the runtime, so once this returns no health call is
    /// still outstanding.
    pub fn check_health(&self, timeout: Duration) -> Result<String, BackendFailure> {
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(EngineCommand::CheckHealth { timeout, reply })
            .map_err(|_| BackendFailure::Transport("request engine is not running".to_string()))?;
        rx.recv()
            .map_err(|_| BackendFailure::Transport("request engine is not running".to_string()))?
    }
}

async fn handle_command(
    backend: &dyn Backend,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Send { operation, request } => {
            let result = backend.send(&request).await;
            match &result {
                Ok(_) => qa_info!("{:?} completed", operation),
                Err(failure) => qa_warn!("{:?} failed: {}", operation, failure),
            }
            let _ = event_tx.send(EngineEvent::Completed { operation, result });
        }
        EngineCommand::CheckHealth { timeout, reply } => {
            // The health future is dropped on expiry, which aborts its request.
            let result = tokio::time::timeout(timeout, backend.health()).await;
            let result = result.unwrap_or_else(|_| {
                Err(BackendFailure::Transport(format!(
                    "no reply within {} ms",
                    timeout.as_millis()
                )))
            });
            let _ = reply.send(result);
        }
    }
}
