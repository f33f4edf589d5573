//! Spec configuration
//!
//! A [`SpecConfig`] is the ordered key/value mapping a spec is built from. It
//! is deliberately permissive: unknown keys and mistyped values are accepted
//! here and reported later, when [`StringSpec`](crate::StringSpec)
//! construction checks every recognized option against its validity rule.
//!
//! [`SpecOptions`] is the typed way to build the same mapping from code.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SpecError};

/// Recognized option keys, in the order they are assigned
pub const RECOGNIZED_KEYS: [&str; 8] = [
    "id",
    "min",
    "max",
    "include",
    "exclude",
    "regexp",
    "unicode",
    "validator",
];

/// Alternative name accepted for `regexp`
pub const PATTERN_ALIAS: &str = "pattern";

/// Whether `key` names an option
pub fn is_recognized_key(key: &str) -> bool {
    key == PATTERN_ALIAS || RECOGNIZED_KEYS.contains(&key)
}

/// Custom validation predicate
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A configuration value
#[derive(Clone)]
pub enum OptionValue {
    /// Present but undefined; the option silently takes its default
    Undefined,
    /// Plain data such as strings, numbers and booleans
    Data(Value),
    /// A compiled pattern
    Pattern(Regex),
    /// A custom predicate
    Validator(Predicate),
}

impl OptionValue {
    /// Wrap a predicate
    pub fn validator<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        OptionValue::Validator(Arc::new(predicate))
    }

    /// Short type name, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Undefined => "undefined",
            OptionValue::Data(Value::Null) => "null",
            OptionValue::Data(Value::Bool(_)) => "boolean",
            OptionValue::Data(Value::Number(_)) => "number",
            OptionValue::Data(Value::String(_)) => "string",
            OptionValue::Data(Value::Array(_)) => "array",
            OptionValue::Data(Value::Object(_)) => "object",
            OptionValue::Pattern(_) => "regexp",
            OptionValue::Validator(_) => "function",
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Undefined => write!(f, "Undefined"),
            OptionValue::Data(value) => f.debug_tuple("Data").field(value).finish(),
            OptionValue::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            OptionValue::Validator(_) => write!(f, "Validator(..)"),
        }
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::Data(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Data(Value::from(value))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Data(Value::from(value))
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Data(Value::from(value))
    }
}

macro_rules! option_value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Data(Value::from(value))
                }
            }
        )*
    };
}

option_value_from_number!(i32, i64, u32, u64, usize, f64);

impl From<Regex> for OptionValue {
    fn from(value: Regex) -> Self {
        OptionValue::Pattern(value)
    }
}

impl From<Predicate> for OptionValue {
    fn from(value: Predicate) -> Self {
        OptionValue::Validator(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(OptionValue::Undefined)
    }
}

/// Ordered configuration mapping
#[derive(Debug, Clone, Default)]
pub struct SpecConfig {
    entries: Vec<(String, OptionValue)>,
}

impl SpecConfig {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing an earlier value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Keys that are not options
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|key| !is_recognized_key(key))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a JSON value; anything other than an object yields an
    /// empty mapping
    pub fn from_json_value(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().fold(Self::new(), |config, (key, value)| {
                config.with(key, OptionValue::Data(value))
            }),
            other => {
                tracing::debug!(kind = %json_kind(&other), "non-object spec configuration ignored");
                Self::new()
            }
        }
    }

    /// Parse JSON text
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_json_value(value))
    }

    /// Parse TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(input)?;
        let value = serde_json::to_value(value)
            .map_err(|e| SpecError::Parse(format!("TOML conversion error: {}", e)))?;
        Ok(Self::from_json_value(value))
    }

    /// Parse YAML text
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(input)?;
        let value = serde_json::to_value(value)
            .map_err(|e| SpecError::Parse(format!("YAML conversion error: {}", e)))?;
        Ok(Self::from_json_value(value))
    }
}

impl<K, V> FromIterator<(K, V)> for SpecConfig
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |config, (key, value)| config.with(key, value))
    }
}

fn json_kind(value: &Value) -> &'static str {
    OptionValue::Data(value.clone()).kind()
}

/// Outcome of checking one option against its validity rule
#[derive(Debug, Clone)]
pub(crate) enum Assigned<T> {
    /// Absent or undefined: use the default without comment
    Default,
    /// Valid value
    Value(T),
    /// Present with the wrong type: use the default and report it
    WrongType,
}

impl<T> Assigned<T> {
    fn from_option(value: Option<&OptionValue>, check: impl FnOnce(&OptionValue) -> Option<T>) -> Self {
        match value {
            None | Some(OptionValue::Undefined) => Assigned::Default,
            Some(value) => check(value).map_or(Assigned::WrongType, Assigned::Value),
        }
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Assigned<U> {
        match self {
            Assigned::Value(value) => Assigned::Value(f(value)),
            Assigned::Default => Assigned::Default,
            Assigned::WrongType => Assigned::WrongType,
        }
    }
}

pub(crate) fn assign_string(value: Option<&OptionValue>) -> Assigned<String> {
    Assigned::from_option(value, |value| match value {
        OptionValue::Data(Value::String(s)) => Some(s.clone()),
        _ => None,
    })
}

pub(crate) fn assign_length(value: Option<&OptionValue>) -> Assigned<usize> {
    Assigned::from_option(value, |value| match value {
        OptionValue::Data(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(whole_number))
            .and_then(|n| usize::try_from(n).ok()),
        _ => None,
    })
}

fn whole_number(f: f64) -> Option<u64> {
    (f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64).then(|| f as u64)
}

pub(crate) fn assign_bool(value: Option<&OptionValue>) -> Assigned<bool> {
    Assigned::from_option(value, |value| match value {
        OptionValue::Data(Value::Bool(b)) => Some(*b),
        _ => None,
    })
}

pub(crate) fn assign_pattern(value: Option<&OptionValue>) -> Assigned<Regex> {
    Assigned::from_option(value, |value| match value {
        OptionValue::Pattern(re) => Some(re.clone()),
        OptionValue::Data(Value::String(source)) => match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::debug!(pattern = %source, error = %e, "pattern failed to compile");
                None
            }
        },
        _ => None,
    })
}

pub(crate) fn assign_validator(value: Option<&OptionValue>) -> Assigned<Predicate> {
    Assigned::from_option(value, |value| match value {
        OptionValue::Validator(predicate) => Some(Arc::clone(predicate)),
        _ => None,
    })
}

/// Typed spec options
///
/// Every field is optional; unset fields take their documented defaults.
///
/// ```rust
/// use string_spec::{SpecOptions, StringSpec};
///
/// let spec = StringSpec::new(SpecOptions::new().id("code").min(2).max(4).exclude(" "));
/// assert!(spec.validate("ab").is_valid());
/// ```
#[derive(Clone, Default)]
pub struct SpecOptions {
    pub id: Option<String>,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub pattern: Option<Regex>,
    pub unicode: Option<bool>,
    pub validator: Option<Predicate>,
}

impl SpecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn unicode(mut self, allowed: bool) -> Self {
        self.unicode = Some(allowed);
        self
    }

    pub fn validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(predicate));
        self
    }
}

impl fmt::Debug for SpecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecOptions")
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

impl From<SpecOptions> for SpecConfig {
    fn from(options: SpecOptions) -> Self {
        let mut config = SpecConfig::new();
        if let Some(id) = options.id {
            config.set("id", id);
        }
        if let Some(min) = options.min {
            config.set("min", min);
        }
        if let Some(max) = options.max {
            config.set("max", max);
        }
        if let Some(include) = options.include {
            config.set("include", include);
        }
        if let Some(exclude) = options.exclude {
            config.set("exclude", exclude);
        }
        if let Some(pattern) = options.pattern {
            config.set("regexp", pattern);
        }
        if let Some(unicode) = options.unicode {
            config.set("unicode", unicode);
        }
        if let Some(validator) = options.validator {
            config.set("validator", validator);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_replaces_in_place() {
        let config = SpecConfig::new()
            .with("min", 1)
            .with("id", "a")
            .with("min", 2);
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["min", "id"]);
        assert!(matches!(config.get("min"), Some(OptionValue::Data(v)) if *v == json!(2)));
    }

    #[test]
    fn test_unknown_keys() {
        let config = SpecConfig::new()
            .with("id", "a")
            .with("colour", "red")
            .with("pattern", "^a")
            .with("maxx", 3);
        assert_eq!(config.unknown_keys().collect::<Vec<_>>(), vec!["colour", "maxx"]);
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert!(SpecConfig::from_json_value(json!([1, 2])).is_empty());
        assert!(SpecConfig::from_json_value(json!("text")).is_empty());
        assert!(SpecConfig::from_json_value(Value::Null).is_empty());
    }

    #[test]
    fn test_loaders() {
        let config = SpecConfig::from_json_str(r#"{"id": "j", "min": 1}"#).unwrap();
        assert_eq!(config.len(), 2);

        let config = SpecConfig::from_toml_str("id = \"t\"\nmax = 8\nunicode = true\n").unwrap();
        assert!(matches!(config.get("unicode"), Some(OptionValue::Data(Value::Bool(true)))));

        let config = SpecConfig::from_yaml_str("id: y\nexclude: \"xyz\"\n").unwrap();
        assert!(matches!(config.get("exclude"), Some(OptionValue::Data(v)) if *v == json!("xyz")));

        assert!(SpecConfig::from_json_str("{not json").is_err());
        assert!(SpecConfig::from_toml_str("= broken").is_err());
    }

    #[test]
    fn test_assign_length_rules() {
        assert!(matches!(assign_length(None), Assigned::Default));
        assert!(matches!(assign_length(Some(&OptionValue::Undefined)), Assigned::Default));
        assert!(matches!(assign_length(Some(&5.into())), Assigned::Value(5)));
        assert!(matches!(assign_length(Some(&4.0.into())), Assigned::Value(4)));
        assert!(matches!(assign_length(Some(&(-1).into())), Assigned::WrongType));
        assert!(matches!(assign_length(Some(&1.5.into())), Assigned::WrongType));
        assert!(matches!(assign_length(Some(&"3".into())), Assigned::WrongType));
        assert!(matches!(assign_length(Some(&Value::Null.into())), Assigned::WrongType));
    }

    #[test]
    fn test_assign_pattern_compiles_strings() {
        assert!(matches!(assign_pattern(Some(&"^[a-z]+$".into())), Assigned::Value(_)));
        assert!(matches!(assign_pattern(Some(&"([".into())), Assigned::WrongType));
        assert!(matches!(assign_pattern(Some(&true.into())), Assigned::WrongType));
    }

    #[test]
    fn test_assign_validator_requires_predicate() {
        assert!(matches!(
            assign_validator(Some(&OptionValue::validator(|s| s.is_empty()))),
            Assigned::Value(_)
        ));
        assert!(matches!(assign_validator(Some(&"fn".into())), Assigned::WrongType));
    }

    #[test]
    fn test_options_into_config() {
        let options = SpecOptions::new()
            .id("typed")
            .max(3)
            .pattern(Regex::new("^a").unwrap())
            .validator(|_| true);
        let config = SpecConfig::from(options);
        assert_eq!(
            config.keys().collect::<Vec<_>>(),
            vec!["id", "max", "regexp", "validator"]
        );
        assert_eq!(config.unknown_keys().count(), 0);
    }

    #[test]
    fn test_option_from_none_is_undefined() {
        let value: OptionValue = Option::<u32>::None.into();
        assert_eq!(value.kind(), "undefined");
    }
}
