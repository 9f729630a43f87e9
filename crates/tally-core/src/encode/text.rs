//! Plain-text rendering for logs and debugging.
//!
//! One line per series:
//! `2023-11-14T22:13:20.000000000Z ns_sub_name{k="v"} = 3`

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat};

use crate::error::{MetricsError, Result};
use crate::snapshot::{MetricSnapshot, Sample, Snapshot};

use super::prometheus::format_value;
use super::{encode, write_labels, Format};

/// Render a snapshot as human-readable text.
pub fn encode_text(snapshot: &Snapshot) -> Result<String> {
    encode(snapshot, TextFormat::default())
}

#[derive(Default)]
struct TextFormat {
    out: String,
    static_labels: Vec<(String, String)>,
    fqname: String,
}

impl Format for TextFormat {
    type Output = String;

    fn begin(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.out.try_reserve(snapshot.series_count() * 80)?;
        self.static_labels = snapshot.static_labels.clone();
        Ok(())
    }

    fn metric(&mut self, metric: &MetricSnapshot) -> Result<()> {
        self.fqname = metric.fqname();
        Ok(())
    }

    fn series(&mut self, metric: &MetricSnapshot, sample: &Sample) -> Result<()> {
        write!(self.out, "{} {}", format_timestamp(sample.timestamp_ns)?, self.fqname)?;
        write_labels(
            &mut self.out,
            &self.static_labels,
            &metric.label_keys,
            &sample.label_values,
        )?;
        writeln!(self.out, " = {}", format_value(sample.value))?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        Ok(self.out)
    }
}

fn format_timestamp(ns: u64) -> Result<String> {
    let secs = i64::try_from(ns / 1_000_000_000)
        .map_err(|_| MetricsError::Encode(format!("timestamp out of range: {ns}")))?;
    // Remainder is always below 1e9.
    let nanos = (ns % 1_000_000_000) as u32;
    let dt = DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| MetricsError::Encode(format!("timestamp out of range: {ns}")))?;
    Ok(dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
}
