//! Monotonic counter handle.

use std::sync::Arc;

use tally_core::error::{MetricsError, Result};
use tally_core::{Identity, MetricKind};

use crate::metric::Metric;

/// Counter instrument. Clones share the same series.
///
/// Values only grow through [`Counter::inc`] and [`Counter::add`];
/// [`Counter::set`] is an explicit override for restores and imports.
#[derive(Clone)]
pub struct Counter {
    metric: Arc<Metric>,
}

impl Counter {
    pub(crate) fn new(metric: Arc<Metric>) -> Self {
        debug_assert_eq!(metric.kind(), MetricKind::Counter);
        Self { metric }
    }

    /// Increment by 1.
    pub fn inc<S: AsRef<str>>(&self, ts: u64, labels: &[S]) -> Result<()> {
        self.metric.update(ts, labels, |v| v + 1.0)
    }

    /// Increment by a non-negative value. NaN is rejected like a negative
    /// delta.
    pub fn add<S: AsRef<str>>(&self, ts: u64, labels: &[S], value: f64) -> Result<()> {
        self.metric.ensure_alive()?;
        if value < 0.0 || value.is_nan() {
            return Err(MetricsError::NegativeDelta(value));
        }
        self.metric.update(ts, labels, |v| v + value)
    }

    /// Overwrite the value unconditionally.
    pub fn set<S: AsRef<str>>(&self, ts: u64, labels: &[S], value: f64) -> Result<()> {
        self.metric.update(ts, labels, |_| value)
    }

    pub fn get_val<S: AsRef<str>>(&self, labels: &[S]) -> Result<f64> {
        self.metric.get(labels)
    }

    pub fn identity(&self) -> &Identity {
        self.metric.identity()
    }

    pub fn help(&self) -> &str {
        self.metric.help()
    }

    pub fn label_keys(&self) -> &[String] {
        self.metric.labels().keys()
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("fqname", &self.identity().fqname())
            .field("label_keys", &self.label_keys())
            .finish()
    }
}
