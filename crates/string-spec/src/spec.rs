//! String spec construction
//!
//! A [`StringSpec`] is built once from a [`SpecConfig`] and is read-only
//! afterwards. Construction never fails. Each configuration problem is
//! reported on the spec's diagnostics channel and the affected option falls
//! back to its default:
//!
//! 1. every unknown key is reported (code 11) and ignored;
//! 2. every recognized option with the wrong type is reported (code 14) and
//!    defaulted;
//! 3. `include` together with a pattern drops the pattern (code 12);
//! 4. `min` greater than `max` raises `max` to `min` (code 13).

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::codes::ErrorCode;
use crate::config::{
    assign_bool, assign_length, assign_pattern, assign_string, assign_validator, Assigned,
    OptionValue, Predicate, SpecConfig, PATTERN_ALIAS,
};
use crate::diagnostics::{DiagnosticEvent, Diagnostics, Subscription};

/// Immutable string constraints
#[derive(Clone)]
pub struct StringSpec {
    pub(crate) id: String,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
    pub(crate) include: String,
    pub(crate) exclude: String,
    pub(crate) pattern: Option<Regex>,
    pub(crate) unicode: bool,
    pub(crate) validator: Option<Predicate>,
    pub(crate) diagnostics: Diagnostics,
}

impl StringSpec {
    /// Build a spec that reports on the global channel
    pub fn new(config: impl Into<SpecConfig>) -> Self {
        Self::with_diagnostics(config, Diagnostics::global())
    }

    /// Build a spec that reports on `diagnostics`
    pub fn with_diagnostics(config: impl Into<SpecConfig>, diagnostics: &Diagnostics) -> Self {
        Builder {
            config: config.into(),
            diagnostics: diagnostics.clone(),
        }
        .build()
    }

    /// Register a handler on the global channel
    pub fn on_error<F>(handler: F) -> Subscription
    where
        F: Fn(&DiagnosticEvent) + Send + Sync + 'static,
    {
        Diagnostics::global().subscribe(handler)
    }

    /// Label used in results and diagnostics
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Minimum length in scalar values
    pub fn min(&self) -> usize {
        self.min
    }

    /// Maximum length in scalar values; `None` means unbounded
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Characters that must all be present
    pub fn include(&self) -> &str {
        &self.include
    }

    /// Characters that must not be present
    pub fn exclude(&self) -> &str {
        &self.exclude
    }

    /// Pattern the value must match, if one is configured
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Whether non-ASCII characters are accepted
    pub fn unicode_allowed(&self) -> bool {
        self.unicode
    }

    /// Whether a custom validator is configured
    pub fn has_custom_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Channel this spec reports on
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl fmt::Debug for StringSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringSpec")
            .field("id", &self.id)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("unicode", &self.unicode)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl Default for StringSpec {
    fn default() -> Self {
        Self::new(SpecConfig::new())
    }
}

struct Builder {
    config: SpecConfig,
    diagnostics: Diagnostics,
}

impl Builder {
    fn build(self) -> StringSpec {
        let raw_id = match self.config.get("id") {
            Some(OptionValue::Data(serde_json::Value::String(id))) => id.clone(),
            _ => String::new(),
        };
        for key in self.config.unknown_keys() {
            self.report(&raw_id, ErrorCode::UnknownKey, Some(key));
        }

        let config = &self.config;
        let id = self.resolve("", "id", assign_string(config.get("id")), String::new());
        let min = self.resolve(&id, "min", assign_length(config.get("min")), 0);
        let max = self.resolve(&id, "max", assign_length(config.get("max")).map(Some), None);
        let include = self.resolve(
            &id,
            "include",
            assign_string(config.get("include")),
            String::new(),
        );
        let exclude = self.resolve(
            &id,
            "exclude",
            assign_string(config.get("exclude")),
            String::new(),
        );
        let (pattern_key, pattern_value) = self.pattern_entry();
        let mut pattern =
            self.resolve(&id, pattern_key, assign_pattern(pattern_value).map(Some), None);
        let unicode = self.resolve(&id, "unicode", assign_bool(config.get("unicode")), false);
        let validator = self.resolve(
            &id,
            "validator",
            assign_validator(config.get("validator")).map(Some),
            None,
        );

        if !include.is_empty() && pattern.is_some() {
            pattern = None;
            self.report(&id, ErrorCode::IncludeWithPattern, None);
        }

        let max = match max {
            Some(max) if min > max => {
                self.report(&id, ErrorCode::MaxBelowMin, None);
                Some(min)
            }
            other => other,
        };

        let spec = StringSpec {
            id,
            min,
            max,
            include,
            exclude,
            pattern,
            unicode,
            validator,
            diagnostics: self.diagnostics,
        };
        tracing::debug!(spec = ?spec, "string spec built");
        spec
    }

    /// `regexp` wins over its alias when both are present
    fn pattern_entry(&self) -> (&'static str, Option<&OptionValue>) {
        match self.config.get("regexp") {
            Some(value) => ("regexp", Some(value)),
            None => (PATTERN_ALIAS, self.config.get(PATTERN_ALIAS)),
        }
    }

    fn resolve<T>(&self, id: &str, key: &str, assigned: Assigned<T>, default: T) -> T {
        match assigned {
            Assigned::Value(value) => value,
            Assigned::Default => default,
            Assigned::WrongType => {
                self.report(id, ErrorCode::InvalidPropType, Some(key));
                default
            }
        }
    }

    fn report(&self, id: &str, code: ErrorCode, field: Option<&str>) {
        let mut event = DiagnosticEvent::new(id, code, None);
        if let Some(field) = field {
            event = event.with_field(field);
        }
        self.diagnostics.emit_event(event);
    }
}

impl From<&StringSpec> for SpecConfig {
    fn from(spec: &StringSpec) -> Self {
        let mut config = SpecConfig::new()
            .with("id", spec.id.clone())
            .with("min", spec.min)
            .with("include", spec.include.clone())
            .with("exclude", spec.exclude.clone())
            .with("unicode", spec.unicode);
        if let Some(max) = spec.max {
            config.set("max", max);
        }
        if let Some(pattern) = &spec.pattern {
            config.set("regexp", pattern.clone());
        }
        if let Some(validator) = &spec.validator {
            config.set("validator", Arc::clone(validator));
        }
        config
    }
}
