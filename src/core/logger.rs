//! Main logger implementation
//!
//! A [`Logger`] is a cheap handle: clones and loggers derived with
//! [`with`](Logger::with) or [`with_group`](Logger::with_group) share the
//! same files, level, metrics and background tasks, and differ only in the
//! encoder that renders their preset attributes.
//!
//! Each call runs through, in order:
//!
//! 1. the closed flag and the minimum level,
//! 2. the filter pipeline (rate limit, conditions, redaction) inside the encoder,
//! 3. encoding to one line,
//! 4. the rotation coordinator, which switches files on a day change and
//!    hands the line to the info stream and, for Warn and above, the error
//!    stream.

use super::attribute::Attribute;
use super::clock::{Clock, SystemClock};
use super::config::Config;
use super::encoder::{build_encoder, RecordEncoder};
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::log_record::{LogRecord, SourceLocation};
use super::metrics::LoggerMetrics;
use super::periodic::PeriodicTask;
use super::retention::{RetentionSweeper, SweepReport, SWEEP_INTERVAL};
use crate::appenders::file::{DailyPaths, LogFileNaming};
use crate::appenders::rotating_file::RotationCoordinator;
use crate::filters::FilterPipeline;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::fs;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

struct LoggerShared {
    config: Config,
    min_level: RwLock<LogLevel>,
    rotation: RotationCoordinator,
    sweeper: RetentionSweeper,
    sweep_task: Mutex<Option<PeriodicTask>>,
    /// Encoder without preset attributes, used for the logger's own reports
    root_encoder: Arc<dyn RecordEncoder>,
    metrics: Arc<LoggerMetrics>,
    closed: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl LoggerShared {
    fn emit(
        &self,
        encoder: &dyn RecordEncoder,
        level: LogLevel,
        message: &str,
        attributes: Vec<Attribute>,
        source: Option<SourceLocation>,
    ) {
        if self.closed.load(Ordering::Acquire) || level < *self.min_level.read() {
            return;
        }

        let mut record = LogRecord::new(self.clock.now(), level, message, attributes);
        if let Some(source) = source {
            record = record.with_source(source);
        }

        let Some(bytes) = encoder.encode(&record) else {
            return;
        };

        match self.rotation.write(level, &bytes) {
            Ok(()) => {
                self.metrics.record_logged();
            }
            // Lost a race with close()
            Err(LoggerError::LoggerStopped) => {}
            Err(e) => {
                self.metrics.record_write_failure();
                eprintln!("[LOGGER ERROR] Failed to write log record: {}", e);
            }
        }
    }

    /// Log through the logger's own streams, or stderr once closed
    fn report(&self, level: LogLevel, message: &str, attributes: Vec<Attribute>) {
        if self.closed.load(Ordering::Acquire) {
            let fields: Vec<String> = attributes.iter().map(ToString::to_string).collect();
            let tag = if level.is_error_stream() { "ERROR" } else { "INFO" };
            eprintln!("[LOGGER {}] {} {}", tag, message, fields.join(" "));
            return;
        }
        self.emit(self.root_encoder.as_ref(), level, message, attributes, None);
    }

    fn sweep_and_report(&self) -> Result<SweepReport> {
        match self.sweeper.sweep() {
            Ok(report) => {
                for name in &report.removed {
                    self.report(
                        LogLevel::Info,
                        "Removed old log file",
                        vec![Attribute::new("file", name.as_str())],
                    );
                }
                for (name, reason) in &report.failures {
                    self.report(
                        LogLevel::Error,
                        "Failed to remove old log file",
                        vec![
                            Attribute::new("file", name.as_str()),
                            Attribute::new("error", reason.as_str()),
                        ],
                    );
                }
                Ok(report)
            }
            Err(e) => {
                self.report(
                    LogLevel::Error,
                    "Failed to read log directory",
                    vec![Attribute::new("error", e.to_string())],
                );
                Err(e)
            }
        }
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let task = self.sweep_task.lock().take();
        if let Some(task) = task {
            task.stop();
        }
        self.rotation.close()
    }
}

impl Drop for LoggerShared {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close logger: {}", e);
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    shared: Arc<LoggerShared>,
    encoder: Arc<dyn RecordEncoder>,
}

impl Logger {
    /// Create the log directory, open today's files and start the retention sweep
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dual_stream_logger::prelude::*;
    ///
    /// let logger = Logger::new(Config::default().with_app_name("billing"))?;
    /// logger.info("service started", attrs!["port" => 8080]);
    /// logger.close()?;
    /// # Ok::<(), LoggerError>(())
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`new`](Self::new) with an injected clock
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;

        fs::create_dir_all(&config.log_dir).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                config.log_dir.display().to_string(),
                e,
            )
        })?;

        let naming = LogFileNaming::new(config.app_name.as_str());
        let rotation = RotationCoordinator::open(
            config.log_dir.clone(),
            naming.clone(),
            config.sink_options(),
            Arc::clone(&clock),
        )?;
        let sweeper = RetentionSweeper::new(
            config.log_dir.clone(),
            naming,
            config.retention_days,
            Arc::clone(&clock),
        );

        let metrics = Arc::new(LoggerMetrics::new());
        let pipeline = Arc::new(FilterPipeline::new(&config.filters));
        let root_encoder = build_encoder(
            config.json_format,
            config.encoder_options(),
            pipeline,
            Arc::clone(&metrics),
        );

        let shared = Arc::new(LoggerShared {
            min_level: RwLock::new(config.min_level),
            config,
            rotation,
            sweeper,
            sweep_task: Mutex::new(None),
            root_encoder: Arc::clone(&root_encoder),
            metrics,
            closed: AtomicBool::new(false),
            clock,
        });

        let weak: Weak<LoggerShared> = Arc::downgrade(&shared);
        let task = PeriodicTask::spawn(
            format!("{}-retention", shared.config.app_name),
            SWEEP_INTERVAL,
            true,
            move || {
                if let Some(shared) = weak.upgrade() {
                    // Failures are already reported through the logger
                    let _ = shared.sweep_and_report();
                }
            },
        )?;
        *shared.sweep_task.lock() = Some(task);

        Ok(Self {
            shared,
            encoder: root_encoder,
        })
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
        let caller = Location::caller();
        let source = self
            .shared
            .config
            .add_source
            .then(|| SourceLocation::from(caller));
        self.shared.emit(
            self.encoder.as_ref(),
            level,
            message,
            attrs.into_iter().collect(),
            source,
        );
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
        self.log(LogLevel::Debug, message, attrs);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
        self.log(LogLevel::Info, message, attrs);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
        self.log(LogLevel::Warn, message, attrs);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: &str, attrs: impl IntoIterator<Item = Attribute>) {
        self.log(LogLevel::Error, message, attrs);
    }

    /// Derived logger that renders `attrs` on every record
    ///
    /// The derived logger shares files, level and lifecycle with `self`.
    #[must_use]
    pub fn with(&self, attrs: impl IntoIterator<Item = Attribute>) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
            encoder: self.encoder.with_attributes(attrs.into_iter().collect()),
        }
    }

    /// Derived logger whose later attributes are rendered as `name.key`
    #[must_use]
    pub fn with_group(&self, name: &str) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
            encoder: self.encoder.with_group(name),
        }
    }

    /// Change the minimum level for this logger and every logger sharing its files
    pub fn set_level(&self, level: LogLevel) {
        *self.shared.min_level.write() = level;
    }

    /// Legacy toggle: `true` logs Debug and above, `false` Info and above
    pub fn set_debug(&self, debug: bool) {
        self.set_level(if debug { LogLevel::Debug } else { LogLevel::Info });
    }

    pub fn level(&self) -> LogLevel {
        *self.shared.min_level.read()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        !self.is_closed() && level >= self.level()
    }

    /// Write out both streams' buffers
    pub fn flush(&self) -> Result<()> {
        self.shared.rotation.flush()
    }

    /// Reopen the files for the current day
    ///
    /// On failure the previous files stay in use.
    pub fn rotate_now(&self) -> Result<()> {
        self.shared.rotation.rotate_now()
    }

    /// Run a retention sweep on a new thread
    pub fn cleanup_now(&self) -> Result<JoinHandle<()>> {
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name(format!("{}-cleanup", self.shared.config.app_name))
            .spawn(move || {
                let _ = shared.sweep_and_report();
            })
            .map_err(|e| LoggerError::io_operation("spawning cleanup thread", "cleanup_now", e))
    }

    /// Run a retention sweep on the calling thread
    pub fn sweep_now(&self) -> Result<SweepReport> {
        self.shared.sweep_and_report()
    }

    /// Names of this app's log files in the log directory, sorted
    pub fn log_files(&self) -> Result<Vec<String>> {
        self.shared
            .rotation
            .naming()
            .list(self.shared.rotation.log_dir())
    }

    pub fn current_log_paths(&self) -> DailyPaths {
        self.shared.rotation.current_paths()
    }

    /// Day of the files currently written, `None` once closed
    pub fn current_day(&self) -> Option<String> {
        self.shared.rotation.current_day()
    }

    /// Stop background tasks, flush and release the files
    ///
    /// Applies to every clone and derived logger. Calling it again returns
    /// `Ok(())`; logging afterwards is a no-op.
    pub fn close(&self) -> Result<()> {
        self.shared.close()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("app_name", &self.shared.config.app_name)
            .field("log_dir", &self.shared.config.log_dir)
            .field("level", &self.level())
            .field("encoder", &self.encoder.name())
            .field("closed", &self.is_closed())
            .finish()
    }
}
