// Logging for toastq
// Text or JSON lines on stderr and/or a log file, each destination with its own level.
//
// Example usage:
// ```
// let config = LogConfig {
//     console_level: LevelFilter::Info,
//     file_level: Some(LevelFilter::Debug),
//     format: LogFormat::Json,
//     destination: LogDestination::Both(PathBuf::from("toastq.log")),
// };
// init_logger(config)?;
// log::info!("Notification store ready");
// ```

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Log destination options
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

impl LogDestination {
    fn writes_console(&self) -> bool {
        !matches!(self, LogDestination::File(_))
    }

    fn file_path(&self) -> Option<&Path> {
        match self {
            LogDestination::Console => None,
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
        }
    }
}

/// JSON log entry structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) => file_level.max(self.console_level),
            None => self.console_level,
        }
    }
}

/// Logger writing formatted records to the configured destinations
pub struct ToastqLogger {
    config: LogConfig,
    file: Mutex<Option<File>>,
}

impl ToastqLogger {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            file: Mutex::new(None),
        }
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_text_message(&self, level: Level, message: &str) -> String {
        format!("{} [{}] {}", Self::format_timestamp(), level.to_string().to_uppercase(), message)
    }

    /// JSON line; records from this crate carry their module path in `detail`
    fn format_json_message(&self, level: Level, target: &str, message: &str) -> Result<String> {
        let detail = target
            .starts_with("toastq::")
            .then(|| serde_json::json!({ "module": target }));
        let entry = JsonLogEntry {
            timestamp: Self::format_timestamp(),
            level: level.to_string().to_uppercase(),
            message: message.to_string(),
            detail,
        };

        serde_json::to_string(&entry)
            .context("Failed to serialize log entry to JSON")
    }

    fn format_record(&self, record: &log::Record) -> String {
        let message = record.args().to_string();
        match self.config.format {
            LogFormat::Text => self.format_text_message(record.level(), &message),
            LogFormat::Json => self
                .format_json_message(record.level(), record.target(), &message)
                .unwrap_or_else(|e| {
                    eprintln!("JSON formatting error: {}. Falling back to text format.", e);
                    self.format_text_message(record.level(), &message)
                }),
        }
    }

    fn should_log_to_console(&self, level: Level) -> bool {
        self.config.destination.writes_console() && level <= self.config.console_level
    }

    fn should_log_to_file(&self, level: Level) -> bool {
        match (self.config.destination.file_path(), self.config.file_level) {
            (Some(_), Some(file_level)) => level <= file_level,
            _ => false,
        }
    }

    fn write_to_console(&self, formatted_message: &str) -> Result<()> {
        writeln!(io::stderr(), "{}", formatted_message)
            .context("Failed to write to console")
    }

    /// Append a line, opening the file on first use
    fn write_to_file(&self, formatted_message: &str, file_path: &Path) -> Result<()> {
        let mut guard = self.file.lock();
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .with_context(|| format!("Failed to open log file: {}", file_path.display()))?;
            *guard = Some(file);
        }

        match guard.as_mut() {
            Some(file) => writeln!(file, "{}", formatted_message).context("Failed to write to log file"),
            None => Ok(()),
        }
    }
}

impl log::Log for ToastqLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log_to_console(metadata.level()) ||
        self.should_log_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let formatted_message = self.format_record(record);

        if self.should_log_to_console(level) {
            if let Err(e) = self.write_to_console(&formatted_message) {
                eprintln!("Console logging error: {}", e);
            }
        }

        if let (true, Some(path)) = (self.should_log_to_file(level), self.config.destination.file_path()) {
            if let Err(e) = self.write_to_file(&formatted_message, path) {
                eprintln!("File logging error: {}", e);
                // File-only logging must not go silent
                if !self.config.destination.writes_console() {
                    let _ = self.write_to_console(&formatted_message);
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();

    log::set_boxed_logger(Box::new(ToastqLogger::new(config)))
        .context("Failed to set global logger")?;

    log::set_max_level(max_level);

    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off", level_str)),
    }
}
