//! Compact binary snapshot format (panic-free decoding).
//!
//! Layout, little-endian, strings are `u32` length + UTF-8 bytes:
//!
//! ```text
//! magic "TLYB" | version u8
//! static_count u32 | (key str, value str) * static_count
//! metric_count u32
//! per metric:
//!   kind u8 | namespace str | subsystem str | name str | help str
//!   key_count u32 | key str * key_count
//!   series_count u32
//!   per series: timestamp_ns u64 | value f64 | label value str * key_count
//! ```
//!
//! Decoding rules:
//! - Never index — always use `Buf` and `remaining()` checks.
//! - Preallocation is capped by the bytes actually left in the payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{MetricsError, Result};
use crate::snapshot::{Identity, MetricKind, MetricSnapshot, Sample, Snapshot};

use super::{encode, Format};

/// Payload magic.
pub const COMPACT_MAGIC: &[u8; 4] = b"TLYB";
/// Current payload version.
pub const COMPACT_VERSION: u8 = 1;

const KIND_COUNTER: u8 = 0;
const KIND_GAUGE: u8 = 1;

/// Encode a snapshot to the compact binary format.
pub fn encode_compact(snapshot: &Snapshot) -> Result<Bytes> {
    encode(snapshot, CompactFormat::default())
}

#[derive(Default)]
struct CompactFormat {
    buf: BytesMut,
}

impl CompactFormat {
    fn put_len(&mut self, len: usize, what: &str) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| MetricsError::Encode(format!("{what} too long: {len}")))?;
        self.buf.put_u32_le(len);
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> Result<()> {
        self.put_len(s.len(), "string")?;
        self.buf.put_slice(s.as_bytes());
        Ok(())
    }
}

impl Format for CompactFormat {
    type Output = Bytes;

    fn begin(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.buf.put_slice(COMPACT_MAGIC);
        self.buf.put_u8(COMPACT_VERSION);

        self.put_len(snapshot.static_labels.len(), "static label list")?;
        for (k, v) in &snapshot.static_labels {
            self.put_str(k)?;
            self.put_str(v)?;
        }
        self.put_len(snapshot.metrics.len(), "metric list")
    }

    fn metric(&mut self, metric: &MetricSnapshot) -> Result<()> {
        self.buf.put_u8(match metric.kind {
            MetricKind::Counter => KIND_COUNTER,
            MetricKind::Gauge => KIND_GAUGE,
        });
        self.put_str(&metric.identity.namespace)?;
        self.put_str(&metric.identity.subsystem)?;
        self.put_str(&metric.identity.name)?;
        self.put_str(&metric.help)?;

        self.put_len(metric.label_keys.len(), "label key list")?;
        for k in &metric.label_keys {
            self.put_str(k)?;
        }
        self.put_len(metric.series.len(), "series list")
    }

    fn series(&mut self, _metric: &MetricSnapshot, sample: &Sample) -> Result<()> {
        self.buf.put_u64_le(sample.timestamp_ns);
        self.buf.put_f64_le(sample.value);
        for v in &sample.label_values {
            self.put_str(v)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<Bytes> {
        Ok(self.buf.freeze())
    }
}

/// Decode a compact binary payload back into a snapshot.
pub fn decode_compact(mut buf: &[u8]) -> Result<Snapshot> {
    if buf.remaining() < COMPACT_MAGIC.len() + 1 {
        return Err(MetricsError::Decode("payload too short".into()));
    }

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != COMPACT_MAGIC {
        return Err(MetricsError::Decode("bad magic".into()));
    }

    let version = buf.get_u8();
    if version != COMPACT_VERSION {
        return Err(MetricsError::Decode(format!("unsupported version: {version}")));
    }

    let static_count = get_len(&mut buf, "static label count")?;
    let mut static_labels = Vec::with_capacity(static_count.min(buf.remaining()));
    for _ in 0..static_count {
        let k = get_str(&mut buf, "static label key")?;
        let v = get_str(&mut buf, "static label value")?;
        static_labels.push((k, v));
    }

    let metric_count = get_len(&mut buf, "metric count")?;
    let mut metrics = Vec::with_capacity(metric_count.min(buf.remaining()));
    for _ in 0..metric_count {
        metrics.push(get_metric(&mut buf)?);
    }

    if buf.has_remaining() {
        return Err(MetricsError::Decode(format!(
            "{} trailing bytes",
            buf.remaining()
        )));
    }

    Ok(Snapshot { static_labels, metrics })
}

fn get_metric(buf: &mut &[u8]) -> Result<MetricSnapshot> {
    if buf.remaining() < 1 {
        return Err(short("metric kind"));
    }
    let kind = match buf.get_u8() {
        KIND_COUNTER => MetricKind::Counter,
        KIND_GAUGE => MetricKind::Gauge,
        other => return Err(MetricsError::Decode(format!("unknown metric kind: {other}"))),
    };

    let namespace = get_str(buf, "namespace")?;
    let subsystem = get_str(buf, "subsystem")?;
    let name = get_str(buf, "name")?;
    let help = get_str(buf, "help")?;

    let key_count = get_len(buf, "label key count")?;
    let mut label_keys = Vec::with_capacity(key_count.min(buf.remaining()));
    for _ in 0..key_count {
        label_keys.push(get_str(buf, "label key")?);
    }

    let series_count = get_len(buf, "series count")?;
    let mut series = Vec::with_capacity(series_count.min(buf.remaining() / 16));
    for _ in 0..series_count {
        if buf.remaining() < 16 {
            return Err(short("series header"));
        }
        let timestamp_ns = buf.get_u64_le();
        let value = buf.get_f64_le();

        let mut label_values = Vec::with_capacity(key_count.min(buf.remaining()));
        for _ in 0..key_count {
            label_values.push(get_str(buf, "label value")?);
        }
        series.push(Sample {
            label_values,
            value,
            timestamp_ns,
        });
    }

    Ok(MetricSnapshot {
        kind,
        identity: Identity {
            namespace,
            subsystem,
            name,
        },
        help,
        label_keys,
        series,
    })
}

fn get_len(buf: &mut &[u8], what: &str) -> Result<usize> {
    if buf.remaining() < 4 {
        return Err(short(what));
    }
    Ok(buf.get_u32_le() as usize)
}

fn get_str(buf: &mut &[u8], what: &str) -> Result<String> {
    let len = get_len(buf, what)?;
    if buf.remaining() < len {
        return Err(short(what));
    }
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| MetricsError::Decode(format!("{what}: invalid utf-8")))
}

fn short(what: &str) -> MetricsError {
    MetricsError::Decode(format!("truncated payload at {what}"))
}
