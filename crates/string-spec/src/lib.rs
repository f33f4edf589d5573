//! String Spec
//!
//! Declarative constraints for strings: length bounds, required and
//! forbidden characters, a pattern, a unicode policy and a custom predicate.
//!
//! ## Features
//!
//! - **Never-failing construction**: malformed configuration degrades to
//!   defaults and is reported as a diagnostic event
//! - **Immutable specs**: all normalization happens before a [`StringSpec`]
//!   is handed out; there are no setters
//! - **Ordered checks**: validation stops at the first failed rule and reports
//!   a stable numeric code
//! - **Coercion**: swap invalid values for a fallback in one call
//! - **Diagnostics channel**: synchronous publish/subscribe error events, with
//!   a process-wide default and injectable isolated channels
//! - **Metrics**: Prometheus counters for validation outcomes and diagnostics
//!
//! ## Architecture
//!
//! 1. **Config** (`config`): the key/value mapping a spec is built from, and
//!    loaders for JSON, TOML and YAML text.
//! 2. **Spec** (`spec`): construction and invariant enforcement.
//! 3. **Validate** (`validate`): the check pipeline, results and coercion.
//! 4. **Diagnostics** (`diagnostics`): error events and subscribers.
//! 5. **Codes** (`codes`): the error code table.
//!
//! ## Example
//!
//! ```rust
//! use string_spec::{Diagnostics, ErrorCode, SpecConfig, StringSpec};
//!
//! let diagnostics = Diagnostics::new();
//! let spec = StringSpec::with_diagnostics(
//!     SpecConfig::new()
//!         .with("id", "username")
//!         .with("min", 3)
//!         .with("max", 16)
//!         .with("exclude", " @"),
//!     &diagnostics,
//! );
//!
//! assert!(spec.validate("ada_l").is_valid());
//!
//! let result = spec.validate("ada lovelace");
//! assert_eq!(result.code, ErrorCode::Excluded);
//! assert_eq!(result.found_chars(), vec![' ']);
//!
//! assert_eq!(spec.coerce("x", "anonymous"), "anonymous");
//! ```

pub mod chars;
pub mod codes;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod spec;
pub mod validate;

pub use codes::ErrorCode;
pub use config::{OptionValue, Predicate, SpecConfig, SpecOptions, RECOGNIZED_KEYS};
pub use diagnostics::{DiagnosticEvent, Diagnostics, Subscription};
pub use error::{Result, SpecError};
pub use metrics::SpecMetrics;
pub use spec::StringSpec;
pub use validate::{coerce_to_string, Fallback, ValidationResult};

/// Library version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
