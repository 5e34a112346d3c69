//! # Dual Stream Logger
//!
//! A structured application logger that writes every record to a daily
//! info file and, for Warn and above, to a separate daily error file.
//!
//! ## Features
//!
//! - **Dual Streams**: `{app}_{date}.log` gets everything, `{app}_error_{date}.log` gets Warn and Error
//! - **Daily Rotation**: files switch on the first write of a new day
//! - **Retention**: a background sweep deletes this app's files older than the retention window
//! - **Filtering**: per-level rate limits, caller conditions, field masking and regex rewrites
//! - **Buffered Writes**: size, interval and level triggered flushing
//! - **Text or JSON**: one line per record, with optional caller location
//!
//! ## Example
//!
//! ```no_run
//! use dual_stream_logger::prelude::*;
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_log_dir("/var/log/billing")
//!     .with_app_name("billing")
//!     .with_json_format(true)
//!     .with_field_mask("password", "***")
//!     .with_rate_limit(LogLevel::Debug, 100, Duration::from_secs(1));
//!
//! let logger = Logger::new(config)?;
//! let requests = logger.with_group("request");
//! requests.info("accepted", attrs!["id" => 17, "password" => "hunter2"]);
//! logger.error("upstream timeout", attrs!["upstream" => "ledger"]);
//! logger.close()?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod filters;
pub mod macros;

pub use crate::core::global;

pub mod prelude {
    pub use crate::attrs;
    pub use crate::core::{
        Attribute, Clock, Config, FieldValue, LogLevel, Logger, LoggerError, LoggerMetrics,
        ManualClock, Result, SweepReport, SystemClock, TimestampFormat,
    };
    pub use crate::filters::{
        any_condition, attribute_condition, combine_conditions, condition, level_condition,
        mask_field, message_contains_condition, redact_field, time_condition, FilterConfig,
    };
}

pub use crate::appenders::{BufferPolicy, DailyPaths, LogFileNaming};
pub use crate::core::{
    Appender, Attribute, Clock, Config, EncoderOptions, FieldValue, LogLevel, LogRecord, Logger,
    LoggerError, LoggerMetrics, ManualClock, RecordEncoder, Result, SweepReport, SystemClock,
    TimestampFormat, DEFAULT_RETENTION_DAYS,
};
pub use crate::filters::{FilterConfig, FilterPipeline};
