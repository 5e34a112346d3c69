//! Process-wide logger
//!
//! The slot starts empty. [`init`] (or [`set_logger`]) fills it, closing
//! any previous logger; [`close`] closes and clears it. While the slot is
//! empty every logging function is a no-op.
//!
//! ```no_run
//! use dual_stream_logger::{global, attrs, Config};
//!
//! global::init(Config::default().with_app_name("worker"))?;
//! global::info("job finished", attrs!["job_id" => 42]);
//! global::close()?;
//! # Ok::<(), dual_stream_logger::LoggerError>(())
//! ```

use super::attribute::Attribute;
use super::config::Config;
use super::error::Result;
use super::log_level::LogLevel;
use super::logger::Logger;
use parking_lot::{const_rwlock, RwLock};
use std::thread::JoinHandle;

static GLOBAL: RwLock<Option<Logger>> = const_rwlock(None);

/// Build a logger from `config` and install it
pub fn init(config: Config) -> Result<()> {
    let logger = Logger::new(config)?;
    set_logger(logger);
    Ok(())
}

pub fn init_default() -> Result<()> {
    init(Config::default())
}

/// Install `logger`, closing the one it replaces
pub fn set_logger(logger: Logger) {
    let previous = GLOBAL.write().replace(logger);
    if let Some(previous) = previous {
        if let Err(e) = previous.close() {
            eprintln!("[LOGGER ERROR] Failed to close replaced global logger: {}", e);
        }
    }
}

/// Handle to the installed logger
pub fn logger() -> Option<Logger> {
    GLOBAL.read().clone()
}

pub fn is_initialized() -> bool {
    GLOBAL.read().is_some()
}

#[track_caller]
pub fn log(level: LogLevel, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
    // The slot lock is released before writing
    if let Some(logger) = logger() {
        logger.log(level, message, attrs);
    }
}

#[track_caller]
pub fn debug(message: &str, attrs: impl IntoIterator<Item = Attribute>) {
    log(LogLevel::Debug, message, attrs);
}

#[track_caller]
pub fn info(message: &str, attrs: impl IntoIterator<Item = Attribute>) {
    log(LogLevel::Info, message, attrs);
}

#[track_caller]
pub fn warn(message: &str, attrs: impl IntoIterator<Item = Attribute>) {
    log(LogLevel::Warn, message, attrs);
}

#[track_caller]
pub fn error(message: &str, attrs: impl IntoIterator<Item = Attribute>) {
    log(LogLevel::Error, message, attrs);
}

pub fn with(attrs: impl IntoIterator<Item = Attribute>) -> Option<Logger> {
    logger().map(|logger| logger.with(attrs))
}

pub fn with_group(name: &str) -> Option<Logger> {
    logger().map(|logger| logger.with_group(name))
}

pub fn set_level(level: LogLevel) {
    if let Some(logger) = logger() {
        logger.set_level(level);
    }
}

pub fn flush() -> Result<()> {
    match logger() {
        Some(logger) => logger.flush(),
        None => Ok(()),
    }
}

pub fn rotate_now() -> Result<()> {
    match logger() {
        Some(logger) => logger.rotate_now(),
        None => Ok(()),
    }
}

pub fn cleanup_now() -> Result<Option<JoinHandle<()>>> {
    logger().map(|logger| logger.cleanup_now()).transpose()
}

pub fn log_files() -> Result<Vec<String>> {
    match logger() {
        Some(logger) => logger.log_files(),
        None => Ok(Vec::new()),
    }
}

/// Close the installed logger and empty the slot
pub fn close() -> Result<()> {
    let previous = GLOBAL.write().take();
    match previous {
        Some(logger) => logger.close(),
        None => Ok(()),
    }
}
