use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use docqa_core::{BackendFailure, Effect, Msg, RequestBody, ValidationError};
use docqa_engine::{BackendSettings, EngineEvent, EngineHandle, SettingsError};
use docqa_logging::{preview, qa_info, qa_warn};

use super::app::AppEvent;

/// Where the shell hands the effects produced by `update`.
pub trait EffectSink {
    /// Starts backend calls and returns the alerts the user must see.
    fn enqueue(&self, effects: Vec<Effect>) -> Vec<ValidationError>;
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: BackendSettings,
        app_tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, SettingsError> {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::new(settings, event_tx)?;
        spawn_event_loop(event_rx, app_tx);
        Ok(Self { engine })
    }

    pub fn check_health(&self, timeout: Duration) -> Result<String, BackendFailure> {
        self.engine.check_health(timeout)
    }
}

impl EffectSink for EffectRunner {
    fn enqueue(&self, effects: Vec<Effect>) -> Vec<ValidationError> {
        let mut alerts = Vec::new();
        for effect in effects {
            match effect {
                Effect::SendRequest { operation, request } => {
                    match &request.body {
                        RequestBody::Multipart { file, .. } => qa_info!(
                            "SendRequest {:?} file={} bytes={}",
                            operation,
                            file.filename,
                            file.bytes.len()
                        ),
                        RequestBody::Json(body) => qa_info!(
                            "SendRequest {:?} body={}",
                            operation,
                            preview(&body.to_string(), 120)
                        ),
                    }
                    self.engine.send(operation, request);
                }
                Effect::Alert(err) => {
                    qa_warn!("Submission refused: {}", err);
                    alerts.push(err);
                }
            }
        }
        alerts
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for event in event_rx {
            let msg = match event {
                EngineEvent::Completed { operation, result } => {
                    Msg::BackendReplied { operation, result }
                }
            };
            if app_tx.send(AppEvent::Msg(msg)).is_err() {
                break;
            }
        }
    });
}
