//! Timestamp formatting utilities
//!
//! Controls how the `time` field is rendered by both encoders.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use dual_stream_logger::core::TimestampFormat;
/// use chrono::Local;
///
/// let format = TimestampFormat::Rfc3339;
/// let timestamp = format.format(&Local::now());
/// assert!(timestamp.contains('T'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with the local offset: `2025-01-08T10:30:45+09:00`
    ///
    /// This is the default format.
    #[default]
    Rfc3339,

    /// RFC 3339 with milliseconds: `2025-01-08T10:30:45.123+09:00`
    Rfc3339Millis,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    ///
    /// ```
    /// use dual_stream_logger::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Whether every strftime directive of a custom format is recognised
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Custom(format_str) => {
                !StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error))
            }
            _ => true,
        }
    }

    /// Format a local timestamp according to this format
    ///
    /// A custom format chrono cannot render falls back to RFC 3339.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, false),
            TimestampFormat::Rfc3339Millis => {
                datetime.to_rfc3339_opts(SecondsFormat::Millis, false)
            }
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut rendered = String::new();
                match write!(rendered, "{}", datetime.format(format_str)) {
                    Ok(()) => rendered,
                    Err(_) => datetime.to_rfc3339_opts(SecondsFormat::Secs, false),
                }
            }
        }
    }

    /// Numeric value for numeric formats, rendered as a JSON number
    #[must_use]
    pub fn numeric(&self, datetime: &DateTime<Local>) -> Option<i64> {
        match self {
            TimestampFormat::Unix => Some(datetime.timestamp()),
            TimestampFormat::UnixMillis => Some(datetime.timestamp_millis()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn fixed_datetime() -> DateTime<Local> {
        FixedOffset::east_opt(0)
            .and_then(|tz| tz.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single())
            .expect("valid datetime")
            .with_timezone(&Local)
    }

    #[test]
    fn test_rfc3339_has_offset() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert_eq!(result.len(), "2025-01-08T10:30:45+00:00".len());
        assert!(result.contains('T'));
        assert!(!result.contains('.'));
    }

    #[test]
    fn test_rfc3339_millis() {
        let result = TimestampFormat::Rfc3339Millis.format(&fixed_datetime());
        assert!(result.contains(".000"));
    }

    #[test]
    fn test_unix_formats() {
        let seconds = TimestampFormat::Unix.format(&fixed_datetime());
        assert_eq!(seconds, "1736332245");

        let millis = TimestampFormat::UnixMillis.numeric(&fixed_datetime());
        assert_eq!(millis, Some(1_736_332_245_000));
        assert_eq!(TimestampFormat::Rfc3339.numeric(&fixed_datetime()), None);
    }

    #[test]
    fn test_custom_format() {
        // Mid-morning UTC on Jan 8th is still 2025 in every timezone
        let format = TimestampFormat::Custom("%Y/%m".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01");
    }

    #[test]
    fn test_unknown_directive_falls_back_to_rfc3339() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(!format.is_valid());
        assert_eq!(
            format.format(&fixed_datetime()),
            TimestampFormat::Rfc3339.format(&fixed_datetime())
        );

        assert!(TimestampFormat::Custom("%Y-%m-%d %H:%M".to_string()).is_valid());
        assert!(TimestampFormat::UnixMillis.is_valid());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TimestampFormat::Rfc3339).expect("serialize");
        assert_eq!(json, "\"Rfc3339\"");

        let format: TimestampFormat =
            serde_json::from_str(r#"{"Custom":"%Y-%m-%d"}"#).expect("deserialize Custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
