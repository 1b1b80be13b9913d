//! Logging configuration
//!
//! Loads from environment variables:
//! - RUST_LOG: Tracing level (debug, info, warn, error)
//! - LOG_FORMAT: Output format (json or text)
//! - LOG_TO_FILE: Also write daily-rotated log files (true/false)
//! - LOG_DIR: Directory for log files (default: ~/.briefly/logs)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (debug, info, briefly=debug, ...)
    pub log_level: String,

    /// Console output format (json or text)
    pub log_format: LogFormat,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Enable file logging
    pub enable_file_logging: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            log_dir: Self::default_log_dir(),
            enable_file_logging: false,
        }
    }
}

impl LoggingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Unknown formats and flags fall back to defaults; logging should never
    /// stop the tool from starting.
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(log_level) = lookup("RUST_LOG") {
            config.log_level = log_level;
        }

        if let Some(log_format) = lookup("LOG_FORMAT") {
            if let Ok(format) = log_format.parse() {
                config.log_format = format;
            }
        }

        if let Some(log_dir) = lookup("LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }

        if let Some(to_file) = lookup("LOG_TO_FILE") {
            config.enable_file_logging = to_file.to_lowercase() == "true" || to_file == "1";
        }

        config
    }

    /// Get default log directory: ~/.briefly/logs
    pub fn default_log_dir() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(format!("{}/.briefly/logs", home))
    }

    /// Ensure log directory exists
    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        if !self.log_dir.exists() {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}
