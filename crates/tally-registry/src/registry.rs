//! Instrument registry and export entry points.
//!
//! Identity is `(namespace, subsystem, name)`. Creating an instrument that
//! already exists returns the existing one when kind, help, and label keys
//! all match, and fails with `DuplicateIdentity` otherwise.
//!
//! Instruments are stored by fully-qualified name, so two identities that
//! join to the same exported name (`http/server/requests` and
//! `http//server_requests`) also conflict.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use tally_core::encode::{self, PrometheusOptions};
use tally_core::error::{MetricsError, Result};
use tally_core::labels::validate_metric_segment;
use tally_core::{Identity, LabelSet, MetricKind, Snapshot};

use crate::config::RegistryConfig;
use crate::counter::Counter;
use crate::gauge::Gauge;
use crate::metric::{Lifecycle, Metric};

struct Registered {
    seq: u64,
    metric: Arc<Metric>,
}

struct RegistryInner {
    /// Keyed by fully-qualified name.
    metrics: DashMap<String, Registered>,
    seq: AtomicU64,
    static_labels: Vec<(String, String)>,
    prometheus: PrometheusOptions,
    lifecycle: Arc<Lifecycle>,
}

/// Shared handle to one registry. Clones refer to the same instruments.
///
/// Typically created once at startup and passed to whoever records or
/// exports metrics. [`Registry::destroy`] ends its life for every clone and
/// every instrument handed out.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry with default export options.
    pub fn new() -> Self {
        Self::build(Vec::new(), PrometheusOptions::default())
    }

    /// Registry with static labels and export options from config.
    pub fn from_config(cfg: &RegistryConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::build(cfg.static_label_pairs(), (&cfg.prometheus).into()))
    }

    fn build(static_labels: Vec<(String, String)>, prometheus: PrometheusOptions) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                metrics: DashMap::new(),
                seq: AtomicU64::new(0),
                static_labels,
                prometheus,
                lifecycle: Arc::new(Lifecycle::default()),
            }),
        }
    }

    pub fn static_labels(&self) -> &[(String, String)] {
        &self.inner.static_labels
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lifecycle.is_destroyed()
    }

    /// Number of registered instruments.
    pub fn len(&self) -> usize {
        self.inner.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.metrics.is_empty()
    }

    pub fn counter_create<S: AsRef<str>>(
        &self,
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        label_keys: &[S],
    ) -> Result<Counter> {
        let metric =
            self.create(MetricKind::Counter, namespace, subsystem, name, help, label_keys)?;
        Ok(Counter::new(metric))
    }

    pub fn gauge_create<S: AsRef<str>>(
        &self,
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        label_keys: &[S],
    ) -> Result<Gauge> {
        let metric = self.create(MetricKind::Gauge, namespace, subsystem, name, help, label_keys)?;
        Ok(Gauge::new(metric))
    }

    fn create<S: AsRef<str>>(
        &self,
        kind: MetricKind,
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        label_keys: &[S],
    ) -> Result<Arc<Metric>> {
        self.inner.lifecycle.ensure_alive()?;

        if name.is_empty() {
            return Err(MetricsError::InvalidName("metric name must not be empty".into()));
        }
        validate_metric_segment(namespace)?;
        validate_metric_segment(subsystem)?;
        validate_metric_segment(name)?;

        let labels = LabelSet::declare(label_keys)?;
        if let Some(k) = labels
            .keys()
            .iter()
            .find(|k| self.inner.static_labels.iter().any(|(sk, _)| sk == *k))
        {
            return Err(MetricsError::InvalidArity(format!(
                "label key {k} shadows a static label"
            )));
        }

        let identity = Identity::new(namespace, subsystem, name);
        match self.inner.metrics.entry(identity.fqname()) {
            Entry::Occupied(e) => {
                let existing = &e.get().metric;
                if existing.identity() == &identity && existing.same_signature(kind, help, &labels)
                {
                    tracing::debug!(
                        fqname = %e.key(),
                        kind = kind.as_str(),
                        "instrument already registered"
                    );
                    return Ok(Arc::clone(existing));
                }
                tracing::warn!(
                    fqname = %e.key(),
                    existing_kind = existing.kind().as_str(),
                    requested_kind = kind.as_str(),
                    "exported name reused with a conflicting identity or signature"
                );
                Err(MetricsError::DuplicateIdentity(e.key().clone()))
            }
            Entry::Vacant(e) => {
                let metric = Arc::new(Metric::new(
                    kind,
                    identity,
                    help.to_string(),
                    labels,
                    Arc::clone(&self.inner.lifecycle),
                ));
                tracing::debug!(
                    fqname = %e.key(),
                    kind = kind.as_str(),
                    arity = metric.labels().arity(),
                    "instrument registered"
                );
                let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
                e.insert(Registered {
                    seq,
                    metric: Arc::clone(&metric),
                });
                Ok(metric)
            }
        }
    }

    /// Fresh point-in-time copy of every instrument, in registration order.
    ///
    /// Instruments created concurrently may or may not appear. Each listed
    /// instrument carries all of its series, each with a consistent
    /// value/timestamp pair.
    pub fn enumerate(&self) -> Result<Snapshot> {
        self.inner.lifecycle.ensure_alive()?;

        let mut registered: Vec<(u64, Arc<Metric>)> = self
            .inner
            .metrics
            .iter()
            .map(|r| (r.value().seq, Arc::clone(&r.value().metric)))
            .collect();
        registered.sort_by_key(|(seq, _)| *seq);

        let snapshot = Snapshot {
            static_labels: self.inner.static_labels.clone(),
            metrics: registered.iter().map(|(_, m)| m.snapshot()).collect(),
        };

        // `destroy` raises the flag before clearing any series, so a copy
        // that overlapped a teardown is caught here.
        self.inner.lifecycle.ensure_alive()?;
        Ok(snapshot)
    }

    pub fn encode_prometheus(&self) -> Result<String> {
        let snapshot = self.enumerate()?;
        let out = encode::encode_prometheus(&snapshot, self.inner.prometheus)?;
        log_encoded("prometheus", &snapshot, out.len());
        Ok(out)
    }

    pub fn encode_text(&self) -> Result<String> {
        let snapshot = self.enumerate()?;
        let out = encode::encode_text(&snapshot)?;
        log_encoded("text", &snapshot, out.len());
        Ok(out)
    }

    pub fn encode_compact_binary(&self) -> Result<Bytes> {
        let snapshot = self.enumerate()?;
        let out = encode::encode_compact(&snapshot)?;
        log_encoded("compact", &snapshot, out.len());
        Ok(out)
    }

    /// Rebuild a live registry from a snapshot.
    ///
    /// Series are restored through `set`, keeping their original values and
    /// timestamps.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let keys: Vec<&str> = snapshot.static_labels.iter().map(|(k, _)| k.as_str()).collect();
        LabelSet::declare(&keys)?;

        let registry = Self::build(snapshot.static_labels, PrometheusOptions::default());
        for m in snapshot.metrics {
            let id = &m.identity;
            match m.kind {
                MetricKind::Counter => {
                    let c = registry.counter_create(
                        &id.namespace,
                        &id.subsystem,
                        &id.name,
                        &m.help,
                        &m.label_keys,
                    )?;
                    for s in &m.series {
                        c.set(s.timestamp_ns, &s.label_values, s.value)?;
                    }
                }
                MetricKind::Gauge => {
                    let g = registry.gauge_create(
                        &id.namespace,
                        &id.subsystem,
                        &id.name,
                        &m.help,
                        &m.label_keys,
                    )?;
                    for s in &m.series {
                        g.set(s.timestamp_ns, &s.label_values, s.value)?;
                    }
                }
            }
        }

        tracing::debug!(metrics = registry.len(), "registry restored from snapshot");
        Ok(registry)
    }

    /// Rebuild a live registry from a compact binary payload.
    pub fn decode_compact_binary(payload: &[u8]) -> Result<Self> {
        Self::from_snapshot(encode::decode_compact(payload)?)
    }

    /// Release every instrument and series.
    ///
    /// Afterwards every operation on this registry, its clones, and any
    /// instrument it created fails with `RegistryDestroyed`. Calling it again
    /// is a no-op.
    pub fn destroy(&self) {
        if !self.inner.lifecycle.destroy() {
            return;
        }

        let released = self.inner.metrics.len();
        let mut series = 0;
        for r in self.inner.metrics.iter() {
            series += r.value().metric.series_len();
            r.value().metric.clear();
        }
        self.inner.metrics.clear();

        tracing::info!(released, series, "registry destroyed");
    }
}

fn log_encoded(format: &'static str, snapshot: &Snapshot, bytes: usize) {
    tracing::debug!(
        format,
        metrics = snapshot.len(),
        series = snapshot.series_count(),
        bytes,
        "snapshot encoded"
    );
}
