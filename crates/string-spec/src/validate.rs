//! Validation pipeline and coercion
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | step | check                 | code |
//! |------|-----------------------|------|
//! | 1    | value is a string     | 26   |
//! | 2    | unicode policy        | 25   |
//! | 3    | maximum length        | 23   |
//! | 4    | minimum length        | 24   |
//! | 5    | required characters   | 21   |
//! | 6    | forbidden characters  | 22   |
//! | 7    | pattern               | 27   |
//! | 8    | custom validator      | 28   |
//!
//! Only the type check emits a diagnostic. Every other failure is an
//! expected outcome and is reported through the returned result alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::chars::{has_unicode, missing_chars, scalar_len, shared_chars};
use crate::codes::ErrorCode;
use crate::diagnostics::DiagnosticEvent;
use crate::spec::StringSpec;

/// Method name reported by [`StringSpec::validate`]
pub const VALIDATE_METHOD: &str = "validate";

/// Method name reported by [`StringSpec::coerce`]
pub const COERCE_METHOD: &str = "coerce";

/// Outcome of validating one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Id of the spec
    pub id: String,
    /// The validated value
    pub value: Value,
    /// `Ok` on success, otherwise the first failed check
    pub code: ErrorCode,
    /// Text for the code; empty on success
    pub error: String,
    /// Offending characters or values, when the check produces them
    pub found: Vec<Value>,
}

impl ValidationResult {
    fn new(spec: &StringSpec, value: Value, code: ErrorCode, found: Vec<Value>) -> Self {
        Self {
            id: spec.id.clone(),
            value,
            code,
            error: code.text().to_string(),
            found,
        }
    }

    /// Whether every check passed
    pub fn is_valid(&self) -> bool {
        self.code == ErrorCode::Ok
    }

    /// Human-readable text for the code
    pub fn message(&self) -> &str {
        &self.error
    }

    /// Offending characters, for the character-set checks
    pub fn found_chars(&self) -> Vec<char> {
        self.found
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| s.chars().next())
            .collect()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "[{}] '{}': valid", self.code, self.id)
        } else {
            write!(f, "[{}] '{}': {}", self.code, self.id, self.error)
        }
    }
}

fn chars_found(chars: Vec<char>) -> Vec<Value> {
    chars.into_iter().map(|c| Value::String(c.to_string())).collect()
}

/// What [`StringSpec::coerce`] returns when validation fails
pub enum Fallback<'a> {
    /// Return this text
    Text(String),
    /// Return the string form of this value
    Value(Value),
    /// Return an empty string
    Absent,
    /// Return the string form of whatever the handler returns for the
    /// failed result
    Handler(Box<dyn Fn(&ValidationResult) -> Value + 'a>),
}

impl<'a> Fallback<'a> {
    /// Wrap a handler
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&ValidationResult) -> Value + 'a,
    {
        Fallback::Handler(Box::new(f))
    }

    fn resolve(&self, result: &ValidationResult) -> String {
        match self {
            Fallback::Text(text) => text.clone(),
            Fallback::Value(value) => coerce_to_string(value),
            Fallback::Absent => String::new(),
            Fallback::Handler(handler) => coerce_to_string(&handler(result)),
        }
    }
}

impl fmt::Debug for Fallback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::Absent => write!(f, "Absent"),
            Fallback::Handler(_) => write!(f, "Handler(..)"),
        }
    }
}

impl From<&str> for Fallback<'_> {
    fn from(text: &str) -> Self {
        Fallback::Text(text.to_string())
    }
}

impl From<String> for Fallback<'_> {
    fn from(text: String) -> Self {
        Fallback::Text(text)
    }
}

impl From<Value> for Fallback<'_> {
    fn from(value: Value) -> Self {
        Fallback::Value(value)
    }
}

impl<'a, T: Into<Fallback<'a>>> From<Option<T>> for Fallback<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Fallback::Absent, Into::into)
    }
}

/// String form of a value: strings as-is, `null` as empty, numbers and
/// booleans as their literal text, arrays and objects as compact JSON
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

impl StringSpec {
    /// Validate a value
    ///
    /// ```rust
    /// use string_spec::{ErrorCode, SpecConfig, StringSpec};
    ///
    /// let spec = StringSpec::new(SpecConfig::new().with("min", 2).with("max", 4));
    /// assert_eq!(spec.validate("ab").code, ErrorCode::Ok);
    /// assert_eq!(spec.validate("a").code, ErrorCode::TooShort);
    /// assert_eq!(spec.validate("abcde").code, ErrorCode::TooLong);
    /// ```
    pub fn validate(&self, value: impl Into<Value>) -> ValidationResult {
        self.check(value.into(), VALIDATE_METHOD)
    }

    /// Validate a string slice
    pub fn validate_str(&self, value: &str) -> ValidationResult {
        self.check_str(value)
    }

    /// Return `value` when it validates, otherwise the string form of
    /// `fallback`
    ///
    /// ```rust
    /// use string_spec::{Fallback, SpecConfig, StringSpec};
    ///
    /// let spec = StringSpec::new(SpecConfig::new().with("exclude", " "));
    /// assert_eq!(spec.coerce("word", "default"), "word");
    /// assert_eq!(spec.coerce("two words", "default"), "default");
    /// assert_eq!(
    ///     spec.coerce("two words", Fallback::handler(|r| r.value.clone())),
    ///     "two words"
    /// );
    /// ```
    pub fn coerce<'a>(&self, value: impl Into<Value>, fallback: impl Into<Fallback<'a>>) -> String {
        let result = self.check(value.into(), COERCE_METHOD);
        if result.is_valid() {
            match result.value {
                Value::String(value) => value,
                other => coerce_to_string(&other),
            }
        } else {
            fallback.into().resolve(&result)
        }
    }

    fn check(&self, value: Value, method: &str) -> ValidationResult {
        match value {
            Value::String(text) => {
                let (code, found) = self.first_failure(&text);
                self.finish(Value::String(text), code, found)
            }
            other => {
                self.diagnostics.emit_event(DiagnosticEvent::new(
                    &self.id,
                    ErrorCode::InvalidArgumentType,
                    Some(method),
                ));
                let found = vec![other.clone()];
                ValidationResult::new(self, other, ErrorCode::InvalidArgumentType, found)
            }
        }
    }

    fn check_str(&self, value: &str) -> ValidationResult {
        let (code, found) = self.first_failure(value);
        self.finish(Value::from(value), code, found)
    }

    fn finish(&self, value: Value, code: ErrorCode, found: Vec<Value>) -> ValidationResult {
        tracing::debug!(id = %self.id, code = code.code(), "string validated");
        ValidationResult::new(self, value, code, found)
    }

    fn first_failure(&self, value: &str) -> (ErrorCode, Vec<Value>) {
        if !self.unicode && has_unicode(value) {
            return (ErrorCode::ContainsUnicode, Vec::new());
        }

        let len = scalar_len(value);
        if self.max.is_some_and(|max| len > max) {
            return (ErrorCode::TooLong, vec![Value::from(value)]);
        }
        if len < self.min {
            return (ErrorCode::TooShort, vec![Value::from(value)]);
        }

        if !self.include.is_empty() {
            let missing = missing_chars(value, &self.include);
            if !missing.is_empty() {
                return (ErrorCode::NotIncluded, chars_found(missing));
            }
        }

        if !self.exclude.is_empty() {
            let excluded = shared_chars(value, &self.exclude);
            if !excluded.is_empty() {
                return (ErrorCode::Excluded, chars_found(excluded));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return (ErrorCode::PatternFailed, Vec::new());
            }
        }

        if let Some(validator) = &self.validator {
            if !validator(value) {
                return (ErrorCode::CustomFailed, Vec::new());
            }
        }

        (ErrorCode::Ok, Vec::new())
    }
}
