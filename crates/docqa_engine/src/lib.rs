//! docqa engine: HTTP transport for backend requests and effect execution.
mod backend;
mod engine;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use engine::EngineHandle;
pub use types::{EngineEvent, SettingsError, DEFAULT_BASE_URL};
