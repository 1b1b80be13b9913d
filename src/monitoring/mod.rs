//! Logging setup for briefly
//!
//! Provides:
//! - Structured logging with tracing
//! - Optional JSON output and daily-rotated log files
//!
//! Logs always go to stderr (or a file) so CLI stdout carries only results.

pub mod config;
pub mod tracing_config;

pub use config::{LogFormat, LoggingConfig};
pub use tracing_config::init_tracing;
