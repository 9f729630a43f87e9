//! Prometheus text exposition format (0.0.4).

use std::fmt::Write;

use crate::error::Result;
use crate::snapshot::{MetricSnapshot, Sample, Snapshot};

use super::{encode, write_labels, Format};

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrometheusOptions {
    /// Append `<timestamp_ms>` to every sample line.
    pub timestamps: bool,
}

impl Default for PrometheusOptions {
    fn default() -> Self {
        Self { timestamps: true }
    }
}

/// Render a snapshot as Prometheus text.
pub fn encode_prometheus(snapshot: &Snapshot, opts: PrometheusOptions) -> Result<String> {
    encode(snapshot, PrometheusFormat::new(opts))
}

struct PrometheusFormat {
    out: String,
    opts: PrometheusOptions,
    static_labels: Vec<(String, String)>,
    fqname: String,
}

impl PrometheusFormat {
    fn new(opts: PrometheusOptions) -> Self {
        Self {
            out: String::new(),
            opts,
            static_labels: Vec::new(),
            fqname: String::new(),
        }
    }
}

impl Format for PrometheusFormat {
    type Output = String;

    fn begin(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.out.try_reserve(snapshot.series_count() * 64)?;
        self.static_labels = snapshot.static_labels.clone();
        Ok(())
    }

    fn metric(&mut self, metric: &MetricSnapshot) -> Result<()> {
        self.fqname = metric.fqname();
        writeln!(self.out, "# HELP {} {}", self.fqname, escape_help(&metric.help))?;
        writeln!(self.out, "# TYPE {} {}", self.fqname, metric.kind.as_str())?;
        Ok(())
    }

    fn series(&mut self, metric: &MetricSnapshot, sample: &Sample) -> Result<()> {
        self.out.push_str(&self.fqname);
        write_labels(
            &mut self.out,
            &self.static_labels,
            &metric.label_keys,
            &sample.label_values,
        )?;
        write!(self.out, " {}", format_value(sample.value))?;
        if self.opts.timestamps {
            write!(self.out, " {}", sample.timestamp_ns / 1_000_000)?;
        }
        self.out.push('\n');
        Ok(())
    }

    fn finish(self) -> Result<String> {
        Ok(self.out)
    }
}

/// HELP text escapes only `\` and newline.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Exposition float syntax.
pub(crate) fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "+Inf" } else { "-Inf" };
        s.to_string()
    } else {
        v.to_string()
    }
}
