//! Log domain types
//!
//! Output lines the run service captured while executing a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A line of output captured from a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Output stream the line came from, when the service knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<LogStream>,
}

impl LogEntry {
    pub fn is_stderr(&self) -> bool {
        self.stream == Some(LogStream::Stderr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "Warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Fixed-width upper-case label for display
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warning => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}
