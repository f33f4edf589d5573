//! Diagnostics channel
//!
//! A publish/subscribe channel for structured error events. Spec construction
//! reports configuration problems here, and validation reports non-string
//! arguments here. Emission never changes control flow: handlers observe
//! events, the caller still gets a usable spec or a result value.
//!
//! Every [`StringSpec`](crate::StringSpec) holds a handle to one channel.
//! [`Diagnostics::global`] is the process-wide default; tests and embedders
//! that want isolation build their own with [`Diagnostics::new`].
//!
//! # Example
//!
//! ```rust
//! use string_spec::{Diagnostics, SpecConfig, StringSpec};
//!
//! let diagnostics = Diagnostics::new();
//! let subscription = diagnostics.subscribe(|event| {
//!     eprintln!("{} [{}]: {}", event.id, event.code, event.text);
//! });
//!
//! let config = SpecConfig::new().with("id", "name").with("min", 3).with("max", 1);
//! let spec = StringSpec::with_diagnostics(config, &diagnostics);
//! assert_eq!(spec.max(), Some(3));
//!
//! subscription.cancel();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::codes::ErrorCode;

/// Sender tag carried by every event
pub const SENDER: &str = "string-spec";

/// Event type carried by every event
pub const EVENT_TYPE: &str = "error";

/// Method reported for configuration codes
pub const CONSTRUCTOR_METHOD: &str = "constructor";

/// A structured error notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Always [`SENDER`]
    pub sender: String,
    /// `"constructor"` or the name of the validating operation
    pub method: String,
    /// Always [`EVENT_TYPE`]
    #[serde(rename = "type")]
    pub event_type: String,
    /// Id of the spec that raised the event
    pub id: String,
    /// Error code
    pub code: ErrorCode,
    /// Text for the code
    pub text: String,
    /// Offending configuration key, for unknown keys and wrong prop types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl DiagnosticEvent {
    /// Build an event; configuration codes always report the constructor
    pub fn new(id: impl Into<String>, code: ErrorCode, method: Option<&str>) -> Self {
        let method = if code.code() < 20 {
            CONSTRUCTOR_METHOD
        } else {
            method.unwrap_or("")
        };
        Self {
            sender: SENDER.to_string(),
            method: method.to_string(),
            event_type: EVENT_TYPE.to_string(),
            id: id.into(),
            code,
            text: code.text().to_string(),
            field: None,
        }
    }

    /// Attach the offending configuration key
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}.{} '{}': {}",
            self.code, self.sender, self.method, self.id, self.text
        )?;
        if let Some(field) = &self.field {
            write!(f, " ({})", field)?;
        }
        Ok(())
    }
}

type Handler = Arc<dyn Fn(&DiagnosticEvent) + Send + Sync>;

struct Inner {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(u64, Handler)>>,
}

/// Handle to a diagnostics channel
///
/// Cloning the handle shares the subscriber list.
#[derive(Clone)]
pub struct Diagnostics {
    inner: Arc<Inner>,
}

impl Diagnostics {
    /// Create an isolated channel with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                handlers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The process-wide default channel
    pub fn global() -> &'static Diagnostics {
        static GLOBAL: OnceLock<Diagnostics> = OnceLock::new();
        GLOBAL.get_or_init(Diagnostics::new)
    }

    /// Register a handler; it runs for every later event, after handlers
    /// registered before it
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&DiagnosticEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::new(handler)));
        Subscription {
            id,
            channel: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Build and deliver an event
    pub fn emit(&self, id: &str, code: ErrorCode, method: Option<&str>) {
        self.emit_event(DiagnosticEvent::new(id, code, method));
    }

    /// Deliver a prepared event to every current handler, in order
    ///
    /// The handler list is copied before dispatch, so handlers may subscribe
    /// or cancel without deadlocking. A panicking handler unwinds into the
    /// caller.
    pub fn emit_event(&self, event: DiagnosticEvent) {
        tracing::warn!(
            id = %event.id,
            code = event.code.code(),
            method = %event.method,
            field = event.field.as_deref().unwrap_or(""),
            "{}",
            event.text
        );

        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler(&event);
        }
    }

    /// Whether two handles share one channel
    pub fn same_channel(&self, other: &Diagnostics) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Deregistration capability returned by [`Diagnostics::subscribe`]
///
/// Dropping it leaves the handler registered.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: Weak<Inner>,
}

impl Subscription {
    /// Remove the handler; later events no longer reach it
    pub fn cancel(self) {
        if let Some(inner) = self.channel.upgrade() {
            inner
                .handlers
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collector(diagnostics: &Diagnostics) -> (Arc<Mutex<Vec<DiagnosticEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = diagnostics.subscribe(move |event| {
            sink.lock().unwrap().push(event.clone());
        });
        (events, subscription)
    }

    #[test]
    fn test_configuration_codes_report_constructor() {
        let event = DiagnosticEvent::new("spec", ErrorCode::MaxBelowMin, Some("validate"));
        assert_eq!(event.method, "constructor");
        assert_eq!(event.sender, "string-spec");
        assert_eq!(event.event_type, "error");
        assert_eq!(event.text, ErrorCode::MaxBelowMin.text());
    }

    #[test]
    fn test_validation_codes_keep_supplied_method() {
        let event = DiagnosticEvent::new("spec", ErrorCode::InvalidArgumentType, Some("validate"));
        assert_eq!(event.method, "validate");

        let event = DiagnosticEvent::new("spec", ErrorCode::InvalidArgumentType, None);
        assert_eq!(event.method, "");
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let diagnostics = Diagnostics::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = diagnostics.subscribe(move |_| first.lock().unwrap().push(1));
        let second = Arc::clone(&order);
        let _b = diagnostics.subscribe(move |_| second.lock().unwrap().push(2));

        diagnostics.emit("x", ErrorCode::UnknownKey, None);
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let diagnostics = Diagnostics::new();
        let (events, subscription) = collector(&diagnostics);

        diagnostics.emit("a", ErrorCode::UnknownKey, None);
        subscription.cancel();
        diagnostics.emit("b", ErrorCode::UnknownKey, None);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "a");
        assert_eq!(diagnostics.subscriber_count(), 0);
    }

    #[test]
    fn test_channels_are_isolated() {
        let left = Diagnostics::new();
        let right = Diagnostics::new();
        let (events, _sub) = collector(&left);

        right.emit("other", ErrorCode::UnknownKey, None);
        assert!(events.lock().unwrap().is_empty());
        assert!(!left.same_channel(&right));
        assert!(left.same_channel(&left.clone()));
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let diagnostics = Diagnostics::new();
        let inner = diagnostics.clone();
        let _sub = diagnostics.subscribe(move |_| {
            let _nested = inner.subscribe(|_| {});
        });

        diagnostics.emit("x", ErrorCode::UnknownKey, None);
        assert_eq!(diagnostics.subscriber_count(), 2);
    }

    #[test]
    fn test_event_serializes_type_field() {
        let event = DiagnosticEvent::new("id", ErrorCode::UnknownKey, None).with_field("colour");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], 11);
        assert_eq!(json["field"], "colour");

        let bare = serde_json::to_value(DiagnosticEvent::new("id", ErrorCode::TooLong, None)).unwrap();
        assert!(bare.get("field").is_none());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Diagnostics::global().same_channel(Diagnostics::global()));
    }
}
