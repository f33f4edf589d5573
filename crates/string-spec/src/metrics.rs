//! Prometheus metrics for spec usage
//!
//! - `string_spec_validations_total` (counter) - validation outcomes by code
//! - `string_spec_diagnostics_total` (counter) - diagnostic events by code and method
//!
//! # Example
//!
//! ```rust
//! use string_spec::{Diagnostics, SpecConfig, SpecMetrics, StringSpec};
//!
//! let metrics = SpecMetrics::new().unwrap();
//! let diagnostics = Diagnostics::new();
//! let _subscription = metrics.observe(&diagnostics);
//!
//! let spec = StringSpec::with_diagnostics(SpecConfig::new().with("max", 3), &diagnostics);
//! metrics.record(&spec.validate("abcd"));
//!
//! assert_eq!(metrics.validations("23"), 1);
//! ```

use prometheus::core::Collector;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Subscription};
use crate::error::{Result, SpecError};
use crate::validate::ValidationResult;

/// Counters for validation outcomes and diagnostic events
#[derive(Clone)]
pub struct SpecMetrics {
    registry: Arc<Registry>,
    validations_total: CounterVec,
    diagnostics_total: CounterVec,
}

impl SpecMetrics {
    /// Create metrics on a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create metrics and register them with `registry`
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let validations_total = CounterVec::new(
            Opts::new(
                "validations_total",
                "Total number of string validations by result code",
            )
            .namespace("string_spec"),
            &["code"],
        )?;

        let diagnostics_total = CounterVec::new(
            Opts::new(
                "diagnostics_total",
                "Total number of diagnostic events by code and method",
            )
            .namespace("string_spec"),
            &["code", "method"],
        )?;

        registry.register(Box::new(validations_total.clone()))?;
        registry.register(Box::new(diagnostics_total.clone()))?;

        Ok(Self {
            registry,
            validations_total,
            diagnostics_total,
        })
    }

    /// Count one validation outcome
    pub fn record(&self, result: &ValidationResult) {
        let code = result.code.to_string();
        self.validations_total
            .with_label_values(&[code.as_str()])
            .inc();
    }

    /// Count every event emitted on `diagnostics` from now on
    pub fn observe(&self, diagnostics: &Diagnostics) -> Subscription {
        let counter = self.diagnostics_total.clone();
        diagnostics.subscribe(move |event| {
            let code = event.code.to_string();
            counter
                .with_label_values(&[code.as_str(), event.method.as_str()])
                .inc();
        })
    }

    /// Current validation count for a code label. Reading never creates a
    /// series, so an unseen code reads as zero.
    pub fn validations(&self, code: &str) -> u64 {
        read_counter(&self.validations_total, &[("code", code)])
    }

    /// Current diagnostic count for a code and method
    pub fn diagnostics(&self, code: &str, method: &str) -> u64 {
        read_counter(&self.diagnostics_total, &[("code", code), ("method", method)])
    }

    /// Registry holding the counters
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all registered metrics in the text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SpecError::Serialization(e.to_string()))
    }
}

fn read_counter(counter: &CounterVec, labels: &[(&str, &str)]) -> u64 {
    counter
        .collect()
        .iter()
        .flat_map(|family| family.get_metric())
        .find(|metric| {
            let pairs = metric.get_label();
            pairs.len() == labels.len()
                && labels.iter().all(|(name, value)| {
                    pairs
                        .iter()
                        .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
                })
        })
        .map(|metric| metric.get_counter().get_value() as u64)
        .unwrap_or(0)
}
