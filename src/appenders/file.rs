//! Daily log file naming and opening
//!
//! Each app writes two files per calendar day:
//!
//! - `{app}_{YYYY-MM-DD}.log` with every admitted record
//! - `{app}_error_{YYYY-MM-DD}.log` with Warn and above
//!
//! A file belongs to an app only if its name is exactly one of these two
//! shapes with a valid date, so `app2_2024-01-01.log` is never claimed by
//! `app`.

use crate::core::{LoggerError, Result};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_EXTENSION: &str = ".log";
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Which of the two daily files a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Info,
    Error,
}

/// Paths of one day's info and error files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPaths {
    pub info: PathBuf,
    pub error: PathBuf,
}

/// File naming convention for one app name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileNaming {
    app_name: String,
}

impl LogFileNaming {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn info_file_name(&self, day: &str) -> String {
        format!("{}_{}{}", self.app_name, day, LOG_EXTENSION)
    }

    pub fn error_file_name(&self, day: &str) -> String {
        format!("{}_error_{}{}", self.app_name, day, LOG_EXTENSION)
    }

    pub fn paths(&self, log_dir: &Path, day: &str) -> DailyPaths {
        DailyPaths {
            info: log_dir.join(self.info_file_name(day)),
            error: log_dir.join(self.error_file_name(day)),
        }
    }

    /// Parse a file name written under this convention
    pub fn parse(&self, file_name: &str) -> Option<(StreamKind, NaiveDate)> {
        let stem = file_name.strip_suffix(LOG_EXTENSION)?;
        let rest = stem.strip_prefix(self.app_name.as_str())?.strip_prefix('_')?;

        if let Some(day) = rest.strip_prefix("error_") {
            if let Ok(date) = NaiveDate::parse_from_str(day, DAY_FORMAT) {
                return Some((StreamKind::Error, date));
            }
        }
        NaiveDate::parse_from_str(rest, DAY_FORMAT)
            .ok()
            .map(|date| (StreamKind::Info, date))
    }

    pub fn owns(&self, file_name: &str) -> bool {
        self.parse(file_name).is_some()
    }

    /// Names of this app's log files in `log_dir`, sorted
    pub fn list(&self, log_dir: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(log_dir).map_err(|e| {
            LoggerError::io_operation(
                "reading log directory",
                log_dir.display().to_string(),
                e,
            )
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.owns(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Open `path` for appending, creating it if missing
pub fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Failed to open log file: {}", e),
            )
        })
}
