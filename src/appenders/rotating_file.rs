//! Daily rotation of the info/error file pair
//!
//! The coordinator holds the active calendar day and the router writing
//! that day's files behind one reader/writer lock. Log calls take the
//! read side to compare the day and write; a day change or an explicit
//! rotation takes the write side, opens the new files, swaps them in and
//! closes the previous ones.
//!
//! If the new files cannot be opened the previous handles stay active, so
//! logging continues into the stale files until a later rotation succeeds.
//! Automatic retries for a failed day are spaced [`ROTATION_RETRY_INTERVAL`]
//! apart.

use super::file::{DailyPaths, LogFileNaming};
use super::router::{DualStreamRouter, SinkOptions};
use crate::core::{day_string, Appender, Clock, LogLevel, LoggerError, Result};
use chrono::{DateTime, Duration, Local};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Wait before retrying a day whose files could not be opened
pub const ROTATION_RETRY_INTERVAL: Duration = Duration::seconds(60);

struct RotationState {
    day: String,
    paths: DailyPaths,
    router: DualStreamRouter,
}

pub struct RotationCoordinator {
    log_dir: PathBuf,
    naming: LogFileNaming,
    options: SinkOptions,
    clock: Arc<dyn Clock>,
    /// `None` once closed
    state: RwLock<Option<RotationState>>,
    /// Day whose automatic rotation failed, and when it may be tried again
    retry: Mutex<Option<(String, DateTime<Local>)>>,
}

impl RotationCoordinator {
    /// Open today's files in `log_dir`
    pub fn open(
        log_dir: impl Into<PathBuf>,
        naming: LogFileNaming,
        options: SinkOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let log_dir = log_dir.into();
        let day = clock.today();
        let paths = naming.paths(&log_dir, &day);
        let router = DualStreamRouter::open(&paths, &options)?;

        Ok(Self {
            log_dir,
            naming,
            options,
            clock,
            state: RwLock::new(Some(RotationState { day, paths, router })),
            retry: Mutex::new(None),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn naming(&self) -> &LogFileNaming {
        &self.naming
    }

    /// Day of the files currently written, `None` once closed
    pub fn current_day(&self) -> Option<String> {
        self.state.read().as_ref().map(|state| state.day.clone())
    }

    /// Paths currently written, or today's paths once closed
    pub fn current_paths(&self) -> DailyPaths {
        match self.state.read().as_ref() {
            Some(state) => state.paths.clone(),
            None => self.naming.paths(&self.log_dir, &self.clock.today()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().is_none()
    }

    /// Write one encoded record, rotating first if the day has changed
    pub fn write(&self, level: LogLevel, bytes: &[u8]) -> Result<()> {
        let now = self.clock.now();
        let today = day_string(&now);
        {
            let state = self.state.read();
            match state.as_ref() {
                None => return Err(LoggerError::LoggerStopped),
                Some(current) if current.day == today || self.retry_pending(&today, now) => {
                    return current.router.append(level, bytes)
                }
                Some(_) => {}
            }
        }

        if let Err(e) = self.rotate_to(&today, false) {
            *self.retry.lock() = Some((today.clone(), now + ROTATION_RETRY_INTERVAL));
            eprintln!(
                "[LOGGER ERROR] Daily rotation to {} failed, writing to previous files: {}",
                today, e
            );
        }

        match self.state.read().as_ref() {
            Some(current) => current.router.append(level, bytes),
            None => Err(LoggerError::LoggerStopped),
        }
    }

    fn retry_pending(&self, day: &str, now: DateTime<Local>) -> bool {
        match self.retry.lock().as_ref() {
            Some((failed_day, next_attempt)) => failed_day == day && now < *next_attempt,
            None => false,
        }
    }

    /// Reopen the files for the current day unconditionally
    pub fn rotate_now(&self) -> Result<()> {
        let today = self.clock.today();
        self.rotate_to(&today, true)
    }

    fn rotate_to(&self, day: &str, force: bool) -> Result<()> {
        let mut guard = self.state.write();
        let Some(current) = guard.as_mut() else {
            return Err(LoggerError::LoggerStopped);
        };
        // Another caller may have rotated, or failed to, while we waited for the lock
        if !force && (current.day == day || self.retry_pending(day, self.clock.now())) {
            return Ok(());
        }

        let paths = self.naming.paths(&self.log_dir, day);
        let router = DualStreamRouter::open(&paths, &self.options).map_err(|e| {
            LoggerError::file_rotation(paths.info.display().to_string(), e.to_string())
        })?;

        *self.retry.lock() = None;
        let previous = std::mem::replace(
            current,
            RotationState {
                day: day.to_string(),
                paths,
                router,
            },
        );
        // Still under the write lock so no record lands in the new files
        // before the old buffers are written out
        if let Err(e) = previous.router.close() {
            eprintln!(
                "[LOGGER ERROR] Failed to close log files for {}: {}",
                previous.day, e
            );
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        match self.state.read().as_ref() {
            Some(current) => current.router.flush(),
            None => Ok(()),
        }
    }

    /// Flush and release the files; later calls are no-ops
    pub fn close(&self) -> Result<()> {
        let previous = self.state.write().take();
        match previous {
            Some(state) => state.router.close(),
            None => Ok(()),
        }
    }
}

impl Drop for RotationCoordinator {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close log files on drop: {}", e);
        }
    }
}
