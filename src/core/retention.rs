//! Retention sweeps over the log directory
//!
//! A sweep removes this app's log files whose modification time is
//! strictly older than `now - retention_days`. Files of other apps are
//! never touched; see [`LogFileNaming`] for the ownership rule.

use super::clock::Clock;
use super::error::{LoggerError, Result};
use crate::appenders::file::LogFileNaming;
use chrono::Duration;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Default number of days log files are kept
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Interval between background sweeps
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// File names removed
    pub removed: Vec<String>,
    /// File names that could not be removed, with the reason
    pub failures: Vec<(String, String)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    log_dir: PathBuf,
    naming: LogFileNaming,
    retention_days: u32,
    clock: Arc<dyn Clock>,
}

impl RetentionSweeper {
    pub fn new(
        log_dir: impl Into<PathBuf>,
        naming: LogFileNaming,
        retention_days: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            log_dir: log_dir.into(),
            naming,
            retention_days,
            clock,
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Files modified before this instant are expired
    ///
    /// A window reaching past the representable calendar expires nothing.
    pub fn cutoff(&self) -> SystemTime {
        Duration::try_days(i64::from(self.retention_days))
            .and_then(|window| self.clock.now().checked_sub_signed(window))
            .map_or(SystemTime::UNIX_EPOCH, SystemTime::from)
    }

    /// Remove expired files
    ///
    /// Fails only if the directory cannot be listed; per-file problems are
    /// collected in the report.
    pub fn sweep(&self) -> Result<SweepReport> {
        let cutoff = self.cutoff();
        let entries = fs::read_dir(&self.log_dir).map_err(|e| {
            LoggerError::io_operation(
                "reading log directory",
                self.log_dir.display().to_string(),
                e,
            )
        })?;

        let mut report = SweepReport::default();
        for entry in entries.filter_map(|entry| entry.ok()) {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !self.naming.owns(&name) {
                continue;
            }

            // Entries whose metadata cannot be read are left alone
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => report.removed.push(name),
                // Removed concurrently by another sweep
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => report.failures.push((name, e.to_string())),
            }
        }

        report.removed.sort();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use chrono::Local;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_days: i64, clock: &ManualClock) {
        let path = dir.join(name);
        fs::write(&path, "line\n").unwrap();
        let modified = SystemTime::from(clock.now() - Duration::days(age_days));
        filetime::set_file_mtime(&path, FileTime::from_system_time(modified)).unwrap();
    }

    fn sweeper(dir: &Path, clock: Arc<ManualClock>) -> RetentionSweeper {
        RetentionSweeper::new(dir, LogFileNaming::new("app"), 7, clock)
    }

    #[test]
    fn test_removes_only_expired_owned_files() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));

        touch(dir.path(), "app_2024-01-01.log", 10, &clock);
        touch(dir.path(), "app_error_2024-01-01.log", 10, &clock);
        touch(dir.path(), "app_2024-01-10.log", 0, &clock);
        touch(dir.path(), "otherapp_2024-01-01.log", 10, &clock);
        touch(dir.path(), "app2_2024-01-01.log", 10, &clock);
        touch(dir.path(), "notes.txt", 30, &clock);

        let report = sweeper(dir.path(), clock).sweep().unwrap();
        assert_eq!(
            report.removed,
            vec!["app_2024-01-01.log", "app_error_2024-01-01.log"]
        );
        assert!(report.is_clean());

        assert!(dir.path().join("app_2024-01-10.log").exists());
        assert!(dir.path().join("otherapp_2024-01-01.log").exists());
        assert!(dir.path().join("app2_2024-01-01.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_file_just_inside_window_is_kept() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        let sweeper = sweeper(dir.path(), clock);

        let path = dir.path().join("app_2024-01-03.log");
        fs::write(&path, "x").unwrap();
        let modified = sweeper.cutoff() + std::time::Duration::from_secs(2);
        filetime::set_file_mtime(&path, FileTime::from_system_time(modified)).unwrap();

        assert!(sweeper.sweep().unwrap().removed.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_clock_drives_cutoff() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        touch(dir.path(), "app_2024-01-05.log", 3, &clock);

        let sweeper = sweeper(dir.path(), clock.clone());
        assert!(sweeper.sweep().unwrap().removed.is_empty());

        clock.advance(Duration::days(5));
        assert_eq!(sweeper.sweep().unwrap().removed, vec!["app_2024-01-05.log"]);
    }

    #[test]
    fn test_huge_retention_expires_nothing() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        touch(dir.path(), "app_2001-01-01.log", 3650, &clock);

        let sweeper = RetentionSweeper::new(dir.path(), LogFileNaming::new("app"), u32::MAX, clock);
        assert_eq!(sweeper.cutoff(), SystemTime::UNIX_EPOCH);
        assert!(sweeper.sweep().unwrap().removed.is_empty());
        assert!(dir.path().join("app_2001-01-01.log").exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        let sweeper = sweeper(&dir.path().join("gone"), clock);
        assert!(matches!(sweeper.sweep(), Err(LoggerError::IoOperation { .. })));
    }
}
