//! Core logger types and traits

pub mod appender;
pub mod attribute;
pub mod clock;
pub mod config;
pub mod encoder;
pub mod error;
pub mod global;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod periodic;
pub mod retention;
pub mod timestamp;

pub use appender::Appender;
pub use attribute::{Attribute, FieldValue};
pub use clock::{day_string, Clock, ManualClock, SystemClock};
pub use config::Config;
pub use encoder::{
    build_encoder, EncoderOptions, FilteringEncoder, JsonEncoder, RecordEncoder, TextEncoder,
};
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, SourceLocation};
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use periodic::PeriodicTask;
pub use retention::{RetentionSweeper, SweepReport, DEFAULT_RETENTION_DAYS};
pub use timestamp::TimestampFormat;
