//! Log record structure

use super::attribute::Attribute;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::panic::Location;

/// Caller location rendered when `add_source` is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// A single log call, created per call and consumed by the encoder
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    pub attributes: Vec<Attribute>,
    pub source: Option<SourceLocation>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(
        timestamp: DateTime<Local>,
        level: LogLevel,
        message: &str,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            timestamp,
            level,
            message: Self::sanitize_message(message),
            attributes,
            source: None,
        }
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }
}
