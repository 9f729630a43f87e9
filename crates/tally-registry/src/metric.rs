//! Series storage shared by counters and gauges.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use tally_core::error::{MetricsError, Result};
use tally_core::{Identity, LabelSet, MetricKind, MetricSnapshot, Sample, SeriesKey};

/// Registry teardown flag, shared by every instrument of one registry.
#[derive(Default)]
pub(crate) struct Lifecycle {
    destroyed: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(MetricsError::RegistryDestroyed);
        }
        Ok(())
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Returns false if the registry was already destroyed.
    pub(crate) fn destroy(&self) -> bool {
        !self.destroyed.swap(true, Ordering::AcqRel)
    }
}

struct Series {
    value: f64,
    timestamp_ns: u64,
    created_seq: u64,
}

/// One instrument: metadata plus `label values -> series`.
pub(crate) struct Metric {
    kind: MetricKind,
    identity: Identity,
    help: String,
    labels: LabelSet,
    series: DashMap<SeriesKey, Series>,
    seq: AtomicU64,
    lifecycle: Arc<Lifecycle>,
}

impl Metric {
    pub(crate) fn new(
        kind: MetricKind,
        identity: Identity,
        help: String,
        labels: LabelSet,
        lifecycle: Arc<Lifecycle>,
    ) -> Self {
        Self {
            kind,
            identity,
            help,
            labels,
            series: DashMap::new(),
            seq: AtomicU64::new(0),
            lifecycle,
        }
    }

    pub(crate) fn kind(&self) -> MetricKind {
        self.kind
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn help(&self) -> &str {
        &self.help
    }

    pub(crate) fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        self.lifecycle.ensure_alive()
    }

    /// Same kind, help, and label keys.
    pub(crate) fn same_signature(&self, kind: MetricKind, help: &str, labels: &LabelSet) -> bool {
        self.kind == kind && self.help == help && &self.labels == labels
    }

    /// Apply `f` to the series value and stamp `ts`, creating the series at 0.
    ///
    /// The entry guard holds the shard write lock for the whole
    /// read-modify-write, so concurrent updates never get lost and a new
    /// series becomes visible already holding its first value.
    pub(crate) fn update<S, F>(&self, ts: u64, labels: &[S], f: F) -> Result<()>
    where
        S: AsRef<str>,
        F: FnOnce(f64) -> f64,
    {
        self.lifecycle.ensure_alive()?;
        let key = self.labels.resolve(labels)?;

        let mut series = self.series.entry(key).or_insert_with(|| Series {
            value: 0.0,
            timestamp_ns: ts,
            created_seq: self.seq.fetch_add(1, Ordering::Relaxed),
        });
        series.value = f(series.value);
        series.timestamp_ns = ts;
        Ok(())
    }

    pub(crate) fn get<S: AsRef<str>>(&self, labels: &[S]) -> Result<f64> {
        self.lifecycle.ensure_alive()?;
        let key = self.labels.resolve(labels)?;
        self.series
            .get(&key)
            .map(|s| s.value)
            .ok_or(MetricsError::SeriesNotFound)
    }

    /// Copy every series out, in creation order.
    pub(crate) fn snapshot(&self) -> MetricSnapshot {
        let mut rows: Vec<(u64, Sample)> = self
            .series
            .iter()
            .map(|r| {
                let s = r.value();
                (
                    s.created_seq,
                    Sample {
                        label_values: r.key().values().to_vec(),
                        value: s.value,
                        timestamp_ns: s.timestamp_ns,
                    },
                )
            })
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);

        MetricSnapshot {
            kind: self.kind,
            identity: self.identity.clone(),
            help: self.help.clone(),
            label_keys: self.labels.keys().to_vec(),
            series: rows.into_iter().map(|(_, s)| s).collect(),
        }
    }

    pub(crate) fn series_len(&self) -> usize {
        self.series.len()
    }

    pub(crate) fn clear(&self) {
        self.series.clear();
    }
}
