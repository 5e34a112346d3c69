//! Per-record admission: rate limiting, conditions and field redaction
//!
//! A [`FilterPipeline`] is built from an immutable [`FilterConfig`] when a
//! logger is constructed. Every record is evaluated in three steps:
//!
//! 1. the rate limiter for the record's level counts it and may drop it,
//! 2. every configured condition must accept it,
//! 3. attributes are masked, regex-rewritten and stripped of empty values.

pub mod condition;
pub mod rate_limit;
pub mod redaction;

pub use condition::{
    any_condition, attribute_condition, combine_conditions, condition, level_condition,
    message_contains_condition, time_condition, time_condition_with_clock, Condition,
    ConditionEngine,
};
pub use rate_limit::{RateLimit, RateLimiter};
pub use redaction::{mask_field, redact_field, FieldFilter, FieldRedactor, RegexFilter};

use crate::core::{Attribute, LogLevel};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Filtering configuration carried by [`Config`](crate::core::Config)
///
/// Conditions and field filters are shared `Arc` closures, so cloning a
/// config is cheap. Rate-limit counters are not stored here; each logger
/// gets its own when its pipeline is built.
#[derive(Clone, Default)]
pub struct FilterConfig {
    conditions: Vec<Condition>,
    field_filters: HashMap<String, FieldFilter>,
    regex_filters: Vec<RegexFilter>,
    rate_limits: HashMap<LogLevel, RateLimit>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_field_filter(mut self, key: impl Into<String>, filter: FieldFilter) -> Self {
        self.field_filters.insert(key.into(), filter);
        self
    }

    /// Add a regex substitution; an invalid pattern is ignored
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_regex_filter(mut self, pattern: &str, replacement: impl Into<String>) -> Self {
        if let Some(filter) = RegexFilter::new(pattern, replacement) {
            self.regex_filters.push(filter);
        }
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rate_limit(mut self, level: LogLevel, max_count: u64, period: Duration) -> Self {
        self.rate_limits
            .insert(level, RateLimit::new(max_count, period));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn field_filter_keys(&self) -> impl Iterator<Item = &str> {
        self.field_filters.keys().map(String::as_str)
    }

    pub fn regex_filters(&self) -> &[RegexFilter] {
        &self.regex_filters
    }

    pub fn rate_limits(&self) -> &HashMap<LogLevel, RateLimit> {
        &self.rate_limits
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.field_filters.is_empty()
            && self.regex_filters.is_empty()
            && self.rate_limits.is_empty()
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.field_filters.keys().collect();
        keys.sort();
        f.debug_struct("FilterConfig")
            .field("conditions", &self.conditions.len())
            .field("field_filters", &keys)
            .field("regex_filters", &self.regex_filters)
            .field("rate_limits", &self.rate_limits)
            .finish()
    }
}

/// Why a record was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    RateLimited,
    ConditionRejected,
}

/// Outcome of evaluating one record
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Drop(DropReason),
    /// Admitted with its attributes unchanged
    Admit,
    /// Admitted with filtered attributes
    AdmitModified(Vec<Attribute>),
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Decision::Drop(_))
    }
}

/// Rate limiter, condition engine and field redactor composed in order
#[derive(Debug, Default)]
pub struct FilterPipeline {
    rate_limiter: RateLimiter,
    conditions: ConditionEngine,
    redactor: FieldRedactor,
}

impl FilterPipeline {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(&config.rate_limits),
            conditions: ConditionEngine::new(config.conditions.clone()),
            redactor: FieldRedactor::new(config.field_filters.clone(), config.regex_filters.clone()),
        }
    }

    pub fn evaluate(&self, level: LogLevel, message: &str, attrs: &[Attribute]) -> Decision {
        self.evaluate_at(level, message, attrs, Instant::now())
    }

    pub fn evaluate_at(
        &self,
        level: LogLevel,
        message: &str,
        attrs: &[Attribute],
        now: Instant,
    ) -> Decision {
        if !self.rate_limiter.check_at(level, now) {
            return Decision::Drop(DropReason::RateLimited);
        }

        if !self.conditions.evaluate(level, message, attrs) {
            return Decision::Drop(DropReason::ConditionRejected);
        }

        match self.redactor.apply(attrs) {
            Some(filtered) => Decision::AdmitModified(filtered),
            None => Decision::Admit,
        }
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn redactor(&self) -> &FieldRedactor {
        &self.redactor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_admits_everything() {
        let pipeline = FilterPipeline::new(&FilterConfig::new());
        let attrs = [Attribute::new("user", "alice")];
        for level in LogLevel::ALL {
            assert_eq!(pipeline.evaluate(level, "msg", &attrs), Decision::Admit);
        }
    }

    #[test]
    fn test_rate_limit_runs_before_conditions() {
        let config = FilterConfig::new()
            .with_rate_limit(LogLevel::Info, 1, Duration::from_secs(60))
            .with_condition(message_contains_condition("keep"));
        let pipeline = FilterPipeline::new(&config);
        let now = Instant::now();

        // Rejected by the condition, but it still consumed the only slot
        assert_eq!(
            pipeline.evaluate_at(LogLevel::Info, "drop me", &[], now),
            Decision::Drop(DropReason::ConditionRejected)
        );
        assert_eq!(
            pipeline.evaluate_at(LogLevel::Info, "keep me", &[], now),
            Decision::Drop(DropReason::RateLimited)
        );
    }

    #[test]
    fn test_conditions_see_unfiltered_attributes() {
        let config = FilterConfig::new()
            .with_field_filter("role", redact_field())
            .with_condition(attribute_condition("role", "admin"));
        let pipeline = FilterPipeline::new(&config);

        let attrs = [Attribute::new("role", "admin"), Attribute::new("action", "delete")];
        assert_eq!(
            pipeline.evaluate(LogLevel::Info, "audit", &attrs),
            Decision::AdmitModified(vec![Attribute::new("action", "delete")])
        );
    }

    #[test]
    fn test_invalid_regex_is_not_registered() {
        let config = FilterConfig::new()
            .with_regex_filter("[unterminated", "x")
            .with_regex_filter(r"\d+", "#");
        assert_eq!(config.regex_filters().len(), 1);
        assert_eq!(config.regex_filters()[0].pattern(), r"\d+");
    }

    #[test]
    fn test_cloned_configs_build_independent_counters() {
        let config = FilterConfig::new().with_rate_limit(LogLevel::Error, 1, Duration::from_secs(60));
        let first = FilterPipeline::new(&config);
        let second = FilterPipeline::new(&config.clone());

        assert!(first.evaluate(LogLevel::Error, "a", &[]).is_admitted());
        assert!(!first.evaluate(LogLevel::Error, "b", &[]).is_admitted());
        assert!(second.evaluate(LogLevel::Error, "c", &[]).is_admitted());
    }
}
