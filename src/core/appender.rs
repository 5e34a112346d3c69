//! Appender trait for log output destinations
//!
//! Appenders receive already-encoded lines. The record's level travels
//! alongside the bytes so sinks can make level-based decisions (flush
//! triggers, console suppression) without parsing their input.

use super::{error::Result, log_level::LogLevel};

pub trait Appender: Send + Sync {
    fn append(&self, level: LogLevel, bytes: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;

    /// Release the destination; calling it again is a no-op
    fn close(&self) -> Result<()> {
        self.flush()
    }

    fn name(&self) -> &str;
}

impl<A: Appender + ?Sized> Appender for Box<A> {
    fn append(&self, level: LogLevel, bytes: &[u8]) -> Result<()> {
        (**self).append(level, bytes)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
