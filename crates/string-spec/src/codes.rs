//! Error code table
//!
//! Codes below 20 describe configuration problems found while building a
//! spec; codes from 21 upward describe why a candidate value was rejected.
//! The numeric values and texts are stable and must not change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Outcome codes reported by construction and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    /// Validation passed
    Ok,
    /// Unknown key found in the configuration mapping
    UnknownKey,
    /// Both `include` and a pattern were supplied
    IncludeWithPattern,
    /// `max` was smaller than `min`
    MaxBelowMin,
    /// A configuration value had the wrong type
    InvalidPropType,
    /// Required characters are missing from the value
    NotIncluded,
    /// Forbidden characters are present in the value
    Excluded,
    /// Value is longer than `max`
    TooLong,
    /// Value is shorter than `min`
    TooShort,
    /// Value contains non-ASCII characters
    ContainsUnicode,
    /// Value is not a string
    InvalidArgumentType,
    /// Value does not match the pattern
    PatternFailed,
    /// Custom validator returned false
    CustomFailed,
}

impl ErrorCode {
    /// Every code in table order
    pub const ALL: [ErrorCode; 13] = [
        ErrorCode::Ok,
        ErrorCode::UnknownKey,
        ErrorCode::IncludeWithPattern,
        ErrorCode::MaxBelowMin,
        ErrorCode::InvalidPropType,
        ErrorCode::NotIncluded,
        ErrorCode::Excluded,
        ErrorCode::TooLong,
        ErrorCode::TooShort,
        ErrorCode::ContainsUnicode,
        ErrorCode::InvalidArgumentType,
        ErrorCode::PatternFailed,
        ErrorCode::CustomFailed,
    ];

    /// Numeric code
    pub fn code(self) -> u8 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::UnknownKey => 11,
            ErrorCode::IncludeWithPattern => 12,
            ErrorCode::MaxBelowMin => 13,
            ErrorCode::InvalidPropType => 14,
            ErrorCode::NotIncluded => 21,
            ErrorCode::Excluded => 22,
            ErrorCode::TooLong => 23,
            ErrorCode::TooShort => 24,
            ErrorCode::ContainsUnicode => 25,
            ErrorCode::InvalidArgumentType => 26,
            ErrorCode::PatternFailed => 27,
            ErrorCode::CustomFailed => 28,
        }
    }

    /// Human-readable text for the code
    pub fn text(self) -> &'static str {
        match self {
            ErrorCode::Ok => "",
            ErrorCode::UnknownKey => "unknown key found in initialization object",
            ErrorCode::IncludeWithPattern => {
                "include and regexp should not be mixed, regexp now ignored"
            }
            ErrorCode::MaxBelowMin => {
                "cannot set max value smaller than min value, max now set to min"
            }
            ErrorCode::InvalidPropType => "invalid initialization prop-type",
            ErrorCode::NotIncluded => "found not included character(s)",
            ErrorCode::Excluded => "found excluded character(s)",
            ErrorCode::TooLong => "too long",
            ErrorCode::TooShort => "too short",
            ErrorCode::ContainsUnicode => "contains unicode character(s)",
            ErrorCode::InvalidArgumentType => "invalid argument type",
            ErrorCode::PatternFailed => "regexp validation failed",
            ErrorCode::CustomFailed => "custom validation failed",
        }
    }

    /// Look up a code by its numeric value
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Raised while building a spec
    pub fn is_configuration(self) -> bool {
        (11..20).contains(&self.code())
    }

    /// Raised while validating a value
    pub fn is_validation(self) -> bool {
        self.code() > 20
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        ErrorCode::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code: {}", code)))
    }
}
