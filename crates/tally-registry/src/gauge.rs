//! Gauge handle: a value that moves freely in both directions.

use std::sync::Arc;

use tally_core::error::Result;
use tally_core::{Identity, MetricKind};

use crate::metric::Metric;

/// Gauge instrument. Clones share the same series.
#[derive(Clone)]
pub struct Gauge {
    metric: Arc<Metric>,
}

impl Gauge {
    pub(crate) fn new(metric: Arc<Metric>) -> Self {
        debug_assert_eq!(metric.kind(), MetricKind::Gauge);
        Self { metric }
    }

    /// Increment by 1.
    pub fn inc<S: AsRef<str>>(&self, ts: u64, labels: &[S]) -> Result<()> {
        self.metric.update(ts, labels, |v| v + 1.0)
    }

    /// Decrement by 1.
    pub fn dec<S: AsRef<str>>(&self, ts: u64, labels: &[S]) -> Result<()> {
        self.metric.update(ts, labels, |v| v - 1.0)
    }

    /// Add an arbitrary signed delta.
    pub fn add<S: AsRef<str>>(&self, ts: u64, labels: &[S], value: f64) -> Result<()> {
        self.metric.update(ts, labels, |v| v + value)
    }

    pub fn sub<S: AsRef<str>>(&self, ts: u64, labels: &[S], value: f64) -> Result<()> {
        self.metric.update(ts, labels, |v| v - value)
    }

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

impl std::fmt::Debug for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gauge")
            .field("fqname", &self.identity().fqname())
            .field("label_keys", &self.label_keys())
            .finish()
    }
}
