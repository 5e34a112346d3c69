//! Logger configuration
//!
//! [`Config`] is a plain value. Builder methods consume it and return a
//! modified copy; nothing is shared between copies except the immutable
//! filter closures, which are reference counted. Rate-limit counters are
//! created per logger, so two loggers built from the same config never
//! influence each other's limits.
//!
//! # Example
//!
//! ```
//! use dual_stream_logger::prelude::*;
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_log_dir("/var/log/billing")
//!     .with_app_name("billing")
//!     .with_level(LogLevel::Debug)
//!     .with_json_format(true)
//!     .with_field_mask("password", "***")
//!     .with_rate_limit(LogLevel::Debug, 100, Duration::from_secs(60));
//!
//! assert_eq!(config.app_name, "billing");
//! ```

use super::encoder::EncoderOptions;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::retention::DEFAULT_RETENTION_DAYS;
use super::timestamp::TimestampFormat;
use crate::appenders::buffered::{BufferPolicy, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL};
use crate::appenders::router::SinkOptions;
use crate::filters::{
    attribute_condition, level_condition, mask_field, message_contains_condition, redact_field,
    time_condition, Condition, FieldFilter, FilterConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_APP_NAME: &str = "app";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_dir: PathBuf,
    pub app_name: String,
    pub min_level: LogLevel,
    pub retention_days: u32,
    pub json_format: bool,
    /// Render the caller's file and line
    pub add_source: bool,
    pub timestamp_format: TimestampFormat,
    /// Mirror the streams to stdout/stderr
    pub console: bool,
    pub use_colors: bool,
    /// Bytes buffered per stream; 0 writes every record through
    pub buffer_size: usize,
    /// Auto-flush period; zero disables the timer
    #[serde(with = "duration_millis", rename = "flush_interval_ms")]
    pub flush_interval: Duration,
    pub flush_on_level: LogLevel,
    #[serde(skip)]
    pub filters: FilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            app_name: DEFAULT_APP_NAME.to_string(),
            min_level: LogLevel::Info,
            retention_days: DEFAULT_RETENTION_DAYS,
            json_format: false,
            add_source: false,
            timestamp_format: TimestampFormat::default(),
            console: true,
            use_colors: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_on_level: LogLevel::Error,
            filters: FilterConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the plain fields from a JSON document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Legacy toggle: `true` logs Debug and above, `false` Info and above
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_debug(self, debug: bool) -> Self {
        self.with_level(if debug { LogLevel::Debug } else { LogLevel::Info })
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_add_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Shorthand for a strftime timestamp format
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_custom_timestamp(self, format_str: &str) -> Self {
        self.with_timestamp_format(TimestampFormat::Custom(format_str.to_string()))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_flush_on_level(mut self, level: LogLevel) -> Self {
        self.flush_on_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.filters = self.filters.with_condition(condition);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level_condition(self, min_level: LogLevel) -> Self {
        self.with_condition(level_condition(min_level))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_message_contains_condition(self, substring: impl Into<String>) -> Self {
        self.with_condition(message_contains_condition(substring))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_attribute_condition(
        self,
        key: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        self.with_condition(attribute_condition(key, expected))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_time_condition(self, start_hour: u32, end_hour: u32) -> Self {
        self.with_condition(time_condition(start_hour, end_hour))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_field_filter(mut self, key: impl Into<String>, filter: FieldFilter) -> Self {
        self.filters = self.filters.with_field_filter(key, filter);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_field_mask(self, key: impl Into<String>, mask: impl Into<String>) -> Self {
        self.with_field_filter(key, mask_field(mask))
    }

    /// Remove the attribute entirely
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_field_redaction(self, key: impl Into<String>) -> Self {
        self.with_field_filter(key, redact_field())
    }

    /// Add a regex substitution over textual values; an invalid pattern is ignored
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_regex_filter(mut self, pattern: &str, replacement: impl Into<String>) -> Self {
        self.filters = self.filters.with_regex_filter(pattern, replacement);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rate_limit(mut self, level: LogLevel, max_count: u64, period: Duration) -> Self {
        self.filters = self.filters.with_rate_limit(level, max_count, period);
        self
    }

    /// Replace empty directory and app name, and zero retention, with defaults
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.log_dir.as_os_str().is_empty() {
            self.log_dir = PathBuf::from(DEFAULT_LOG_DIR);
        }
        if self.app_name.trim().is_empty() {
            self.app_name = DEFAULT_APP_NAME.to_string();
        }
        if self.retention_days == 0 {
            self.retention_days = DEFAULT_RETENTION_DAYS;
        }
        self
    }

    /// Reject values that would break file naming or record rendering
    ///
    /// The app name becomes part of file names, so it must be a plain name.
    pub fn validate(&self) -> Result<()> {
        if self.app_name.contains(['/', '\\']) || self.app_name == "." || self.app_name == ".." {
            return Err(LoggerError::config(
                "app_name",
                format!("'{}' must not contain path separators", self.app_name),
            ));
        }
        if !self.timestamp_format.is_valid() {
            return Err(LoggerError::config(
                "timestamp_format",
                format!("{:?} is not a valid strftime format", self.timestamp_format),
            ));
        }
        Ok(())
    }

    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            timestamp_format: self.timestamp_format.clone(),
            add_source: self.add_source,
        }
    }

    pub fn sink_options(&self) -> SinkOptions {
        SinkOptions {
            buffer: BufferPolicy {
                capacity: self.buffer_size,
                flush_interval: self.flush_interval,
                flush_on_level: self.flush_on_level,
            },
            console: self.console,
            use_colors: self.use_colors,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
