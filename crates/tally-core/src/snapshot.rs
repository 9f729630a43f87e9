//! Point-in-time view of a registry.
//!
//! These are plain owned values: the registry copies its series out under
//! short per-series locks, then every encoder works on this data without
//! touching live instruments.

use serde::{Deserialize, Serialize};

/// Instrument type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    /// Name used by the Prometheus `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// `(namespace, subsystem, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub subsystem: String,
    pub name: String,
}

impl Identity {
    pub fn new(namespace: &str, subsystem: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            subsystem: subsystem.to_string(),
            name: name.to_string(),
        }
    }

    /// Underscore-joined name, empty segments omitted.
    pub fn fqname(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// One series value at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: f64,
    /// Last update, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
}

/// One instrument and all of its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub kind: MetricKind,
    pub identity: Identity,
    pub help: String,
    pub label_keys: Vec<String>,
    /// Series in creation order.
    pub series: Vec<Sample>,
}

impl MetricSnapshot {
    pub fn fqname(&self) -> String {
        self.identity.fqname()
    }
}

/// Whole-registry snapshot. Metrics are in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub static_labels: Vec<(String, String)>,
    #[serde(default)]
    pub metrics: Vec<MetricSnapshot>,
}

impl Snapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, MetricSnapshot> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Total number of series across all metrics.
    pub fn series_count(&self) -> usize {
        self.metrics.iter().map(|m| m.series.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a MetricSnapshot;
    type IntoIter = std::slice::Iter<'a, MetricSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}
