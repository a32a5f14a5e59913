//! Platform logging initialization for the docqa shell.
//!
//! File output goes to `docqa.log` in the working directory unless the
//! settings name another path.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const DEFAULT_LOG_FILE: &str = "docqa.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to the log file only; keeps the interactive prompt clean.
    #[default]
    File,
    /// Write to terminal (stderr for warnings and errors, stdout otherwise).
    Terminal,
    /// Write to both file and terminal.
    Both,
    /// Discard log output.
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub destination: LogDestination,
    pub level: LevelFilter,
    pub file: PathBuf,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            destination: LogDestination::default(),
            level: LevelFilter::Info,
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Installs the global logger. Safe to call once; later calls are ignored.
pub fn initialize(options: &LogOptions) {
    let config = build_config();
    let level = options.level;

    let loggers: Vec<Box<dyn SharedLogger>> = match options.destination {
        LogDestination::Off => return,
        LogDestination::File => match create_file_logger(&options.file, level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![term_logger(level, config)],
        LogDestination::Both => {
            let mut loggers = vec![term_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(&options.file, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn term_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
