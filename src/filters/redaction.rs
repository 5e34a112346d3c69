//! Field-level masking and regex redaction

use crate::core::{Attribute, FieldValue};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Rewrites the value of one attribute key
pub type FieldFilter = Arc<dyn Fn(&str, &FieldValue) -> FieldValue + Send + Sync>;

/// Replace the value with a fixed mask
pub fn mask_field(mask: impl Into<String>) -> FieldFilter {
    let mask = mask.into();
    Arc::new(move |_, _| FieldValue::String(mask.clone()))
}

/// Replace the value with the empty string, which removes the attribute
pub fn redact_field() -> FieldFilter {
    Arc::new(|_, _| FieldValue::String(String::new()))
}

/// Pattern substitution applied to every textual attribute value
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
    replacement: String,
}

impl RegexFilter {
    /// Compile a filter; an invalid pattern yields `None`
    ///
    /// `replacement` supports `$1` / `$name` capture expansion.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Option<Self> {
        Regex::new(pattern).ok().map(|pattern| Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// Applies per-key filters, then regex rules, then drops empty values
#[derive(Clone, Default)]
pub struct FieldRedactor {
    field_filters: HashMap<String, FieldFilter>,
    regex_filters: Vec<RegexFilter>,
}

impl FieldRedactor {
    pub fn new(field_filters: HashMap<String, FieldFilter>, regex_filters: Vec<RegexFilter>) -> Self {
        Self {
            field_filters,
            regex_filters,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_filters.is_empty() && self.regex_filters.is_empty()
    }

    /// Filter a single value
    ///
    /// Regex rules run after the key filter, so a rule can rewrite a mask.
    pub fn redact_value(&self, key: &str, value: &FieldValue) -> FieldValue {
        let mut value = match self.field_filters.get(key) {
            Some(filter) => filter(key, value),
            None => value.clone(),
        };

        if self.regex_filters.is_empty() {
            return value;
        }
        if let FieldValue::String(text) = &mut value {
            for rule in &self.regex_filters {
                let replaced = match rule.apply(text.as_str()) {
                    Cow::Owned(replaced) => Some(replaced),
                    Cow::Borrowed(_) => None,
                };
                if let Some(replaced) = replaced {
                    *text = replaced;
                }
            }
        }

        value
    }

    /// Filter an attribute sequence
    ///
    /// Returns `None` when nothing changed, so callers can keep the
    /// original slice.
    pub fn apply(&self, attrs: &[Attribute]) -> Option<Vec<Attribute>> {
        let mut changed = false;
        let mut filtered = Vec::with_capacity(attrs.len());

        for attr in attrs {
            let value = self.redact_value(&attr.key, &attr.value);
            if value.is_empty() {
                changed = true;
                continue;
            }
            if value != attr.value {
                changed = true;
            }
            filtered.push(Attribute {
                key: attr.key.clone(),
                value,
            });
        }

        changed.then_some(filtered)
    }

    /// Filter an attribute sequence, always returning an owned result
    pub fn apply_owned(&self, attrs: Vec<Attribute>) -> Vec<Attribute> {
        match self.apply(&attrs) {
            Some(filtered) => filtered,
            None => attrs,
        }
    }
}

impl fmt::Debug for FieldRedactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.field_filters.keys().collect();
        keys.sort();
        f.debug_struct("FieldRedactor")
            .field("field_filters", &keys)
            .field("regex_filters", &self.regex_filters)
            .finish()
    }
}
