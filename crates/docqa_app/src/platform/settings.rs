use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use docqa_engine::{BackendSettings, DEFAULT_BASE_URL};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::{LogDestination, LogOptions, DEFAULT_LOG_FILE};

pub const SETTINGS_FILENAME: &str = "docqa.ron";
/// Overrides `base_url` from the settings file when set and non-empty.
pub const BASE_URL_ENV: &str = "DOCQA_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub base_url: String,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl AppSettings {
    /// Loads `docqa.ron` from `dir`. A missing file yields defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(SETTINGS_FILENAME);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading settings from {path:?}"));
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing settings in {path:?}"))
    }

    pub fn with_base_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        self
    }

    pub fn backend_settings(&self) -> anyhow::Result<BackendSettings> {
        let settings = BackendSettings {
            base_url: self.base_url.clone(),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn log_options(&self) -> anyhow::Result<LogOptions> {
        let level = LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))?;
        Ok(LogOptions {
            destination: self.log_destination,
            level,
            file: self.log_file.clone(),
        })
    }
}
