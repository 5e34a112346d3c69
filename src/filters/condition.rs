//! Admission predicates over level, message and attributes

use crate::core::{Attribute, Clock, LogLevel, SystemClock};
use chrono::Timelike;
use std::fmt;
use std::sync::Arc;

/// A pure predicate deciding whether a record may be written
pub type Condition = Arc<dyn Fn(LogLevel, &str, &[Attribute]) -> bool + Send + Sync>;

/// Wrap a closure as a [`Condition`]
pub fn condition<F>(f: F) -> Condition
where
    F: Fn(LogLevel, &str, &[Attribute]) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Admit records at or above `min_level`
pub fn level_condition(min_level: LogLevel) -> Condition {
    condition(move |level, _, _| level >= min_level)
}

/// Admit records whose message contains `substring`
pub fn message_contains_condition(substring: impl Into<String>) -> Condition {
    let substring = substring.into();
    condition(move |_, message, _| message.contains(substring.as_str()))
}

/// Admit records carrying `key` whose rendered value equals `expected`
pub fn attribute_condition(key: impl Into<String>, expected: impl Into<String>) -> Condition {
    let key = key.into();
    let expected = expected.into();
    condition(move |_, _, attrs| {
        attrs
            .iter()
            .any(|attr| attr.key == key && attr.value.to_string() == expected)
    })
}

/// Admit records logged between `start_hour` and `end_hour` inclusive, local time
pub fn time_condition(start_hour: u32, end_hour: u32) -> Condition {
    time_condition_with_clock(start_hour, end_hour, Arc::new(SystemClock))
}

pub fn time_condition_with_clock(start_hour: u32, end_hour: u32, clock: Arc<dyn Clock>) -> Condition {
    condition(move |_, _, _| {
        let hour = clock.now().hour();
        hour >= start_hour && hour <= end_hour
    })
}

/// AND of all conditions; stops at the first rejection
pub fn combine_conditions(conditions: Vec<Condition>) -> Condition {
    condition(move |level, message, attrs| {
        conditions
            .iter()
            .all(|condition| condition(level, message, attrs))
    })
}

/// OR of all conditions; stops at the first acceptance
pub fn any_condition(conditions: Vec<Condition>) -> Condition {
    condition(move |level, message, attrs| {
        conditions
            .iter()
            .any(|condition| condition(level, message, attrs))
    })
}

/// Top-level condition list, AND-combined
#[derive(Clone, Default)]
pub struct ConditionEngine {
    conditions: Vec<Condition>,
}

impl ConditionEngine {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// An empty list admits everything
    pub fn evaluate(&self, level: LogLevel, message: &str, attrs: &[Attribute]) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition(level, message, attrs))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Debug for ConditionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionEngine")
            .field("conditions", &self.conditions.len())
            .finish()
    }
}
