//! Record encoders
//!
//! An encoder turns a [`LogRecord`] into one line of bytes. Encoders are
//! immutable: attaching attributes or opening a group returns a derived
//! encoder and leaves the original untouched, so derived loggers can share
//! sinks while rendering different preset attributes.
//!
//! - [`TextEncoder`]: `time=... level=INFO msg="..." key=value`
//! - [`JsonEncoder`]: `{"time":"...","level":"INFO","msg":"...","key":"value"}`
//! - [`FilteringEncoder`]: runs the filter pipeline before delegating

use super::attribute::{Attribute, FieldValue};
use super::log_record::LogRecord;
use super::metrics::LoggerMetrics;
use super::timestamp::TimestampFormat;
use crate::filters::{Decision, DropReason, FilterPipeline};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

/// Converts records to bytes and derives encoders with preset attributes
pub trait RecordEncoder: Send + Sync + fmt::Debug {
    /// Encode one record, or `None` if the record must not be written
    fn encode(&self, record: &LogRecord) -> Option<Vec<u8>>;

    /// Derive an encoder that renders `attrs` before every call's attributes
    fn with_attributes(&self, attrs: Vec<Attribute>) -> Arc<dyn RecordEncoder>;

    /// Derive an encoder that nests later attributes under `name`
    ///
    /// An empty name returns an equivalent encoder.
    fn with_group(&self, name: &str) -> Arc<dyn RecordEncoder>;

    fn name(&self) -> &str;
}

/// Rendering options shared by the text and JSON encoders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    pub timestamp_format: TimestampFormat,
    pub add_source: bool,
}

/// Preset attributes and the active group prefix
#[derive(Debug, Clone, Default)]
struct Preset {
    attributes: Vec<Attribute>,
    prefix: String,
}

impl Preset {
    fn qualify(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    fn with_attributes(&self, attrs: Vec<Attribute>) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.extend(attrs.into_iter().map(|attr| Attribute {
            key: self.qualify(&attr.key),
            value: attr.value,
        }));
        Self {
            attributes,
            prefix: self.prefix.clone(),
        }
    }

    fn with_group(&self, name: &str) -> Self {
        let mut prefix = self.prefix.clone();
        if !name.is_empty() {
            prefix.push_str(name);
            prefix.push('.');
        }
        Self {
            attributes: self.attributes.clone(),
            prefix,
        }
    }

    /// Preset attributes first, then the call's attributes under the group
    fn for_each<F>(&self, record: &LogRecord, mut f: F)
    where
        F: FnMut(&str, &FieldValue),
    {
        for attr in &self.attributes {
            f(&attr.key, &attr.value);
        }
        for attr in &record.attributes {
            if self.prefix.is_empty() {
                f(&attr.key, &attr.value);
            } else {
                f(&self.qualify(&attr.key), &attr.value);
            }
        }
    }
}

/// Line-oriented `key=value` encoder
#[derive(Debug, Clone)]
pub struct TextEncoder {
    options: Arc<EncoderOptions>,
    preset: Preset,
}

impl TextEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self {
            options: Arc::new(options),
            preset: Preset::default(),
        }
    }

    fn needs_quoting(value: &str) -> bool {
        value.is_empty()
            || value
                .chars()
                .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
    }

    fn push_value(line: &mut String, value: &str) {
        if Self::needs_quoting(value) {
            line.push('"');
            for c in value.chars() {
                match c {
                    '"' => line.push_str("\\\""),
                    '\\' => line.push_str("\\\\"),
                    '\n' => line.push_str("\\n"),
                    '\r' => line.push_str("\\r"),
                    '\t' => line.push_str("\\t"),
                    _ => line.push(c),
                }
            }
            line.push('"');
        } else {
            line.push_str(value);
        }
    }

    fn push_pair(line: &mut String, key: &str, value: &str) {
        if !line.is_empty() {
            line.push(' ');
        }
        Self::push_value(line, key);
        line.push('=');
        Self::push_value(line, value);
    }

    /// Render a record without the trailing newline
    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(128);
        let time = self.options.timestamp_format.format(&record.timestamp);
        Self::push_pair(&mut line, "time", &time);
        Self::push_pair(&mut line, "level", record.level.to_str());
        if self.options.add_source {
            if let Some(source) = record.source {
                let _ = write!(line, " source={}:{}", source.file, source.line);
            }
        }
        Self::push_pair(&mut line, "msg", &record.message);

        self.preset.for_each(record, |key, value| {
            Self::push_pair(&mut line, key, &value.to_string());
        });
        line
    }
}

impl RecordEncoder for TextEncoder {
    fn encode(&self, record: &LogRecord) -> Option<Vec<u8>> {
        let mut line = self.render(record);
        line.push('\n');
        Some(line.into_bytes())
    }

    fn with_attributes(&self, attrs: Vec<Attribute>) -> Arc<dyn RecordEncoder> {
        Arc::new(Self {
            options: Arc::clone(&self.options),
            preset: self.preset.with_attributes(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn RecordEncoder> {
        Arc::new(Self {
            options: Arc::clone(&self.options),
            preset: self.preset.with_group(name),
        })
    }

    fn name(&self) -> &str {
        "text"
    }
}

const RESERVED_JSON_KEYS: [&str; 4] = ["time", "level", "source", "msg"];

/// One JSON object per line
///
/// Duplicate attribute keys keep their first position and last value.
/// Attributes named like a built-in field are written as `attr.<key>`.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    options: Arc<EncoderOptions>,
    preset: Preset,
}

impl JsonEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self {
            options: Arc::new(options),
            preset: Preset::default(),
        }
    }

    pub fn to_value(&self, record: &LogRecord) -> serde_json::Value {
        let mut object = serde_json::Map::new();

        let format = &self.options.timestamp_format;
        let time = match format.numeric(&record.timestamp) {
            Some(number) => serde_json::Value::Number(number.into()),
            None => serde_json::Value::String(format.format(&record.timestamp)),
        };
        object.insert("time".to_string(), time);
        object.insert(
            "level".to_string(),
            serde_json::Value::String(record.level.to_str().to_string()),
        );
        if self.options.add_source {
            if let Some(source) = record.source {
                object.insert(
                    "source".to_string(),
                    serde_json::json!({ "file": source.file, "line": source.line }),
                );
            }
        }
        object.insert(
            "msg".to_string(),
            serde_json::Value::String(record.message.clone()),
        );

        self.preset.for_each(record, |key, value| {
            let key = if RESERVED_JSON_KEYS.contains(&key) {
                format!("attr.{}", key)
            } else {
                key.to_string()
            };
            object.insert(key, value.to_json_value());
        });

        serde_json::Value::Object(object)
    }
}

impl RecordEncoder for JsonEncoder {
    fn encode(&self, record: &LogRecord) -> Option<Vec<u8>> {
        match serde_json::to_vec(&self.to_value(record)) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                Some(bytes)
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to encode record as JSON: {}", e);
                None
            }
        }
    }

    fn with_attributes(&self, attrs: Vec<Attribute>) -> Arc<dyn RecordEncoder> {
        Arc::new(Self {
            options: Arc::clone(&self.options),
            preset: self.preset.with_attributes(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn RecordEncoder> {
        Arc::new(Self {
            options: Arc::clone(&self.options),
            preset: self.preset.with_group(name),
        })
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Gates another encoder behind a [`FilterPipeline`]
///
/// Conditions see the call's own attributes. Preset attributes are passed
/// through the field redactor once, when they are attached.
pub struct FilteringEncoder {
    inner: Arc<dyn RecordEncoder>,
    pipeline: Arc<FilterPipeline>,
    metrics: Arc<LoggerMetrics>,
}

impl FilteringEncoder {
    pub fn new(
        inner: Arc<dyn RecordEncoder>,
        pipeline: Arc<FilterPipeline>,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            inner,
            pipeline,
            metrics,
        }
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    fn derive(&self, inner: Arc<dyn RecordEncoder>) -> Arc<dyn RecordEncoder> {
        Arc::new(Self {
            inner,
            pipeline: Arc::clone(&self.pipeline),
            metrics: Arc::clone(&self.metrics),
        })
    }
}

impl fmt::Debug for FilteringEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringEncoder")
            .field("inner", &self.inner)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl RecordEncoder for FilteringEncoder {
    fn encode(&self, record: &LogRecord) -> Option<Vec<u8>> {
        match self
            .pipeline
            .evaluate(record.level, &record.message, &record.attributes)
        {
            Decision::Drop(DropReason::RateLimited) => {
                self.metrics.record_rate_limited();
                None
            }
            Decision::Drop(DropReason::ConditionRejected) => {
                self.metrics.record_filtered();
                None
            }
            Decision::Admit => self.inner.encode(record),
            Decision::AdmitModified(attributes) => {
                let filtered = LogRecord {
                    timestamp: record.timestamp,
                    level: record.level,
                    message: record.message.clone(),
                    attributes,
                    source: record.source,
                };
                self.inner.encode(&filtered)
            }
        }
    }

    fn with_attributes(&self, attrs: Vec<Attribute>) -> Arc<dyn RecordEncoder> {
        let attrs = self.pipeline.redactor().apply_owned(attrs);
        self.derive(self.inner.with_attributes(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn RecordEncoder> {
        self.derive(self.inner.with_group(name))
    }

    fn name(&self) -> &str {
        "filtering"
    }
}

/// Build the encoder a logger uses for its configuration
pub fn build_encoder(
    json_format: bool,
    options: EncoderOptions,
    pipeline: Arc<FilterPipeline>,
    metrics: Arc<LoggerMetrics>,
) -> Arc<dyn RecordEncoder> {
    let base: Arc<dyn RecordEncoder> = if json_format {
        Arc::new(JsonEncoder::new(options))
    } else {
        Arc::new(TextEncoder::new(options))
    };
    Arc::new(FilteringEncoder::new(base, pipeline, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, SourceLocation};
    use crate::filters::{mask_field, message_contains_condition, FilterConfig};
    use chrono::{DateTime, Local, TimeZone};
    use std::time::Duration;

    fn timestamp() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
    }

    fn record(level: LogLevel, message: &str, attrs: Vec<Attribute>) -> LogRecord {
        LogRecord::new(timestamp(), level, message, attrs)
    }

    fn text(encoder: &dyn RecordEncoder, record: &LogRecord) -> String {
        String::from_utf8(encoder.encode(record).expect("record encoded")).expect("utf-8 output")
    }

    fn custom_time() -> EncoderOptions {
        EncoderOptions {
            timestamp_format: TimestampFormat::Custom("%H:%M:%S".to_string()),
            add_source: false,
        }
    }

    #[test]
    fn test_text_line_layout() {
        let encoder = TextEncoder::new(custom_time());
        let line = text(
            &encoder,
            &record(
                LogLevel::Info,
                "user logged in",
                vec![Attribute::new("user", "alice"), Attribute::new("attempts", 3)],
            ),
        );
        assert_eq!(
            line,
            "time=10:30:45 level=INFO msg=\"user logged in\" user=alice attempts=3\n"
        );
    }

    #[test]
    fn test_text_quotes_values_that_need_it() {
        let encoder = TextEncoder::new(custom_time());
        let line = text(
            &encoder,
            &record(
                LogLevel::Warn,
                "q",
                vec![
                    Attribute::new("query", "id=1"),
                    Attribute::new("empty", ""),
                    Attribute::new("said", "a \"b\""),
                ],
            ),
        );
        assert!(line.contains("query=\"id=1\""));
        assert!(line.contains("empty=\"\""));
        assert!(line.contains(r#"said="a \"b\"""#));
    }

    #[test]
    fn test_source_rendered_only_when_enabled() {
        let source = SourceLocation {
            file: "src/main.rs",
            line: 42,
        };
        let rec = record(LogLevel::Error, "boom", Vec::new()).with_source(source);

        let plain = TextEncoder::new(custom_time());
        assert!(!text(&plain, &rec).contains("source="));

        let with_source = TextEncoder::new(EncoderOptions {
            add_source: true,
            ..custom_time()
        });
        assert!(text(&with_source, &rec).contains(" source=src/main.rs:42 msg=boom"));

        let json = JsonEncoder::new(EncoderOptions {
            add_source: true,
            ..custom_time()
        });
        let value = json.to_value(&rec);
        assert_eq!(value["source"]["file"], "src/main.rs");
        assert_eq!(value["source"]["line"], 42);
    }

    #[test]
    fn test_preset_attributes_and_groups() {
        let encoder = TextEncoder::new(custom_time())
            .with_attributes(vec![Attribute::new("service", "billing")])
            .with_group("req")
            .with_attributes(vec![Attribute::new("id", 7)]);
        let line = text(
            encoder.as_ref(),
            &record(LogLevel::Info, "done", vec![Attribute::new("status", 200)]),
        );
        assert!(line.ends_with("msg=done service=billing req.id=7 req.status=200\n"));
    }

    #[test]
    fn test_json_key_order_and_last_write_wins() {
        let encoder = JsonEncoder::new(custom_time())
            .with_attributes(vec![Attribute::new("user", "preset")]);
        let line = text(
            encoder.as_ref(),
            &record(
                LogLevel::Error,
                "failed",
                vec![Attribute::new("code", 500), Attribute::new("user", "call")],
            ),
        );
        assert_eq!(
            line,
            "{\"time\":\"10:30:45\",\"level\":\"ERROR\",\"msg\":\"failed\",\"user\":\"call\",\"code\":500}\n"
        );
    }

    #[test]
    fn test_json_attributes_cannot_overwrite_builtin_fields() {
        let encoder = JsonEncoder::new(custom_time())
            .with_attributes(vec![Attribute::new("level", "DEBUG")]);
        let line = text(
            encoder.as_ref(),
            &record(
                LogLevel::Error,
                "failed",
                vec![Attribute::new("msg", "spoofed"), Attribute::new("time", 0)],
            ),
        );
        assert_eq!(
            line,
            "{\"time\":\"10:30:45\",\"level\":\"ERROR\",\"msg\":\"failed\",\"attr.level\":\"DEBUG\",\"attr.msg\":\"spoofed\",\"attr.time\":0}\n"
        );
    }

    #[test]
    fn test_json_numeric_timestamp() {
        let encoder = JsonEncoder::new(EncoderOptions {
            timestamp_format: TimestampFormat::Unix,
            add_source: false,
        });
        let rec = record(LogLevel::Info, "tick", Vec::new());
        let value = encoder.to_value(&rec);
        assert_eq!(value["time"], rec.timestamp.timestamp());
    }

    #[test]
    fn test_filtering_encoder_drops_and_counts() {
        let config = FilterConfig::new()
            .with_rate_limit(LogLevel::Debug, 1, Duration::from_secs(60))
            .with_condition(message_contains_condition("keep"));
        let metrics = Arc::new(LoggerMetrics::new());
        let encoder = build_encoder(
            false,
            custom_time(),
            Arc::new(FilterPipeline::new(&config)),
            Arc::clone(&metrics),
        );

        assert!(encoder.encode(&record(LogLevel::Info, "skip", Vec::new())).is_none());
        assert!(encoder.encode(&record(LogLevel::Info, "keep", Vec::new())).is_some());
        assert!(encoder.encode(&record(LogLevel::Debug, "keep", Vec::new())).is_some());
        assert!(encoder.encode(&record(LogLevel::Debug, "keep", Vec::new())).is_none());

        assert_eq!(metrics.filtered_count(), 1);
        assert_eq!(metrics.rate_limited_count(), 1);
    }

    #[test]
    fn test_filtering_encoder_redacts_call_and_preset_attributes() {
        let config = FilterConfig::new().with_field_filter("password", mask_field("***"));
        let encoder = build_encoder(
            true,
            custom_time(),
            Arc::new(FilterPipeline::new(&config)),
            Arc::new(LoggerMetrics::new()),
        )
        .with_attributes(vec![Attribute::new("password", "preset-secret")])
        .with_group("auth");

        let line = text(
            encoder.as_ref(),
            &record(
                LogLevel::Info,
                "login",
                vec![Attribute::new("password", "call-secret")],
            ),
        );
        assert!(!line.contains("secret"));
        assert!(line.contains("\"password\":\"***\""));
        assert!(line.contains("\"auth.password\":\"***\""));
    }
}
