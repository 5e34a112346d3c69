//! Logging macros for ergonomic log message formatting.
//!
//! The level macros format their message like `format!`. Attributes go in
//! an optional `{ key => value, ... }` block before the message.
//!
//! # Examples
//!
//! ```no_run
//! use dual_stream_logger::prelude::*;
//! use dual_stream_logger::info;
//!
//! let logger = Logger::new(Config::default())?;
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With attributes
//! info!(logger, { "user_id" => 42, "action" => "login" }, "User {} logged in", "alice");
//! # Ok::<(), LoggerError>(())
//! ```

/// Build a `Vec<Attribute>` from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use dual_stream_logger::{attrs, Attribute, FieldValue};
///
/// let attrs = attrs!["user" => "alice", "attempts" => 3];
/// assert_eq!(attrs[0], Attribute::new("user", "alice"));
/// assert_eq!(attrs[1].value, FieldValue::Int(3));
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        ::std::vec::Vec::<$crate::Attribute>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Attribute::new($key, $value)),+]
    };
}

/// Log a message at an explicit level.
///
/// ```no_run
/// # use dual_stream_logger::prelude::*;
/// # let logger = Logger::new(Config::default())?;
/// use dual_stream_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, { "code" => 500 }, "Request failed after {} ms", 120);
/// # Ok::<(), LoggerError>(())
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {
        $logger.log($level, &::std::format!($($arg)+), $crate::attrs![$($key => $value),*])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, &::std::format!($($arg)+), ::std::iter::empty())
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, { $($attrs:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, { $($attrs)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, { $($attrs:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, { $($attrs)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, { $($attrs:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, { $($attrs)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// Records at Warn and above also land in the error file.
#[macro_export]
macro_rules! error {
    ($logger:expr, { $($attrs:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, { $($attrs)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
