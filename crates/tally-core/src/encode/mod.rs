//! Snapshot encoders (Prometheus text, plain text, compact binary).
//!
//! All three share one traversal, [`encode`], which walks the snapshot in
//! order and hands each metric and series to a [`Format`]. A format only
//! renders items; it never sees live instruments or locks.
//!
//! Encoders are all-or-nothing: any error aborts the walk and the partially
//! written buffer is dropped with the format.

pub mod compact;
pub mod prometheus;
pub mod text;

use std::fmt::Write;

use crate::error::{MetricsError, Result};
use crate::snapshot::{MetricSnapshot, Sample, Snapshot};

pub use compact::{decode_compact, encode_compact};
pub use prometheus::{encode_prometheus, PrometheusOptions};
pub use text::encode_text;

/// Per-item rendering hooks driven by [`encode`].
pub trait Format {
    type Output;

    /// Called once before any metric.
    fn begin(&mut self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }

    /// Called once per metric, before its series.
    fn metric(&mut self, metric: &MetricSnapshot) -> Result<()>;

    /// Called once per series of the current metric.
    fn series(&mut self, metric: &MetricSnapshot, sample: &Sample) -> Result<()>;

    fn finish(self) -> Result<Self::Output>;
}

/// Walk `snapshot` in order and render it with `format`.
pub fn encode<F: Format>(snapshot: &Snapshot, mut format: F) -> Result<F::Output> {
    tracing::trace!(
        metrics = snapshot.len(),
        series = snapshot.series_count(),
        "walking snapshot"
    );

    format.begin(snapshot)?;
    for metric in snapshot {
        format.metric(metric)?;
        for sample in &metric.series {
            if sample.label_values.len() != metric.label_keys.len() {
                return Err(MetricsError::Encode(format!(
                    "arity mismatch in {}: {} keys, {} values",
                    metric.fqname(),
                    metric.label_keys.len(),
                    sample.label_values.len()
                )));
            }
            format.series(metric, sample)?;
        }
    }
    format.finish()
}

/// Escape a label value (`\`, `"`, newline).
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Write `{k="v",...}` with static labels first; nothing when both are empty.
pub(crate) fn write_labels(
    out: &mut String,
    static_labels: &[(String, String)],
    keys: &[String],
    values: &[String],
) -> Result<()> {
    if static_labels.is_empty() && keys.is_empty() {
        return Ok(());
    }

    out.push('{');
    let pairs = static_labels
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(keys.iter().map(String::as_str).zip(values.iter().map(String::as_str)));
    for (i, (k, v)) in pairs.enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{}=\"{}\"", k, escape_label(v))?;
    }
    out.push('}');
    Ok(())
}
