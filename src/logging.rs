//! Process-wide message log.
//!
//! The log is set up once with [`init_logger`] and written with [`log`].
//! Messages go to the console, to `<app_name>.log`, or to both. The learning
//! core never calls into this module; code that wants to report through it
//! takes a `FnMut(LogLevel, &str)` sink, and [`log`] is one such sink.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// General information.
    Info,
    /// Debugging detail.
    Debug,
    /// Something did not go as expected.
    Warning,
    /// An operation failed.
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(LogError::UnknownLevel(s.to_string())),
        }
    }
}

/// Where log messages are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Standard error only.
    Console,
    /// Log file only.
    File,
    /// Standard error and the log file.
    Both,
}

impl LogMode {
    fn console(self) -> bool {
        matches!(self, LogMode::Console | LogMode::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogMode::File | LogMode::Both)
    }
}

/// Settings for [`init_logger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Application name; the log file is `<app_name>.log`.
    pub app_name: String,

    /// Output target.
    pub mode: LogMode,

    /// Truncate an existing log file instead of appending to it.
    pub override_prev_log: bool,

    /// Lowest level written. `RUST_LOG` takes precedence when set.
    pub level: LogLevel,

    /// Directory for the log file. Defaults to the working directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_name: "rust_qlearn".to_string(),
            mode: LogMode::Console,
            override_prev_log: false,
            level: LogLevel::Info,
            log_dir: None,
        }
    }
}

impl LoggerConfig {
    /// Console logging for `app_name`.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the output target.
    pub fn with_mode(mut self, mode: LogMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: truncate the previous log file.
    pub fn with_override(mut self, override_prev_log: bool) -> Self {
        self.override_prev_log = override_prev_log;
        self
    }

    /// Builder method: set the lowest level written.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Builder method: set the log file directory.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Path of the log file.
    pub fn log_path(&self) -> PathBuf {
        let file_name = format!("{}.log", self.app_name);
        match &self.log_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

static LOGGER: OnceLock<LoggerConfig> = OnceLock::new();

/// Open the log file, appending or truncating as configured.
pub fn open_log_file(path: &Path, override_prev_log: bool) -> Result<File, LogError> {
    let mut options = OpenOptions::new();
    options.create(true);
    if override_prev_log {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options
        .open(path)
        .map_err(|e| LogError::Io(format!("{}: {}", path.display(), e)))
}

/// Install the process-wide logger.
///
/// # Errors
/// - [`LogError::AlreadyInitialized`] if a logger is already installed.
/// - [`LogError::Io`] if the log file cannot be opened.
pub fn init_logger(config: &LoggerConfig) -> Result<(), LogError> {
    if LOGGER.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

    let console = config
        .mode
        .console()
        .then(|| tfmt::layer().with_writer(std::io::stderr));

    let file = if config.mode.file() {
        let file = open_log_file(&config.log_path(), config.override_prev_log)?;
        Some(tfmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|_| LogError::AlreadyInitialized)?;

    // A concurrent caller could win the race after the subscriber was set; the
    // subscriber is what matters, so losing here is harmless.
    let _ = LOGGER.set(config.clone());
    Ok(())
}

/// Settings of the installed logger, if any.
pub fn logger_config() -> Option<&'static LoggerConfig> {
    LOGGER.get()
}

/// Write `message` at `level`.
///
/// Without an installed logger the message is dropped, like any `tracing`
/// event with no subscriber.
pub fn log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Info => tracing::info!("{}", message),
        LogLevel::Debug => tracing::debug!("{}", message),
        LogLevel::Warning => tracing::warn!("{}", message),
        LogLevel::Error => tracing::error!("{}", message),
    }
}

/// Errors raised while setting up logging.
#[derive(Debug, Clone, PartialEq)]
pub enum LogError {
    /// A logger has already been installed for this process.
    AlreadyInitialized,
    /// The log file could not be opened.
    Io(String),
    /// Level name not recognised.
    UnknownLevel(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::AlreadyInitialized => write!(f, "Logger is already initialized"),
            LogError::Io(msg) => write!(f, "Failed to open log file {}", msg),
            LogError::UnknownLevel(s) => write!(f, "Unknown log level '{}'", s),
        }
    }
}

impl std::error::Error for LogError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_level_parsing() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(LogError::UnknownLevel(_))
        ));
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
    }

    #[test]
    fn test_log_path() {
        let config = LoggerConfig::new("selftest");
        assert_eq!(config.log_path(), PathBuf::from("selftest.log"));
        let config = config.with_log_dir("/tmp/logs");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/logs/selftest.log"));
    }

    #[test]
    fn test_open_log_file_append_and_truncate() {
        let path = std::env::temp_dir().join(format!("rust_qlearn_log_{}.log", std::process::id()));

        let mut file = open_log_file(&path, true).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);

        let mut file = open_log_file(&path, false).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        let mut file = open_log_file(&path, true).unwrap();
        writeln!(file, "third").unwrap();
        drop(file);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "third\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_log_without_subscriber_is_silent() {
        log(LogLevel::Warning, "nobody is listening");
    }
}
