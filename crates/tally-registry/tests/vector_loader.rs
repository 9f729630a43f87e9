//! JSON test vector loader for registry encoding tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde::Deserialize;

use tally_registry::{config, Counter, Gauge, Registry};

#[derive(Debug, Deserialize)]
pub struct EncodeVector {
    pub description: String,
    #[serde(default)]
    pub config: Option<String>,
    pub instruments: Vec<InstrumentDecl>,
    #[serde(default)]
    pub ops: Vec<Op>,
    pub expect_prometheus: String,
    pub expect_text: String,
}

#[derive(Debug, Deserialize)]
pub struct InstrumentDecl {
    pub kind: String,
    pub namespace: String,
    pub subsystem: String,
    pub name: String,
    pub help: String,
    pub label_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Op {
    pub metric: usize,
    pub op: String,
    pub ts: u64,
    pub labels: Vec<String>,
    #[serde(default)]
    pub value: f64,
}

pub enum Instrument {
    Counter(Counter),
    Gauge(Gauge),
}

impl EncodeVector {
    /// Build the registry described by the vector and replay its ops.
    pub fn build(&self) -> Registry {
        let registry = match &self.config {
            Some(yaml) => Registry::from_config(&config::load_from_str(yaml).unwrap()).unwrap(),
            None => Registry::new(),
        };

        let instruments: Vec<Instrument> = self
            .instruments
            .iter()
            .map(|d| match d.kind.as_str() {
                "counter" => Instrument::Counter(
                    registry
                        .counter_create(&d.namespace, &d.subsystem, &d.name, &d.help, &d.label_keys)
                        .unwrap(),
                ),
                "gauge" => Instrument::Gauge(
                    registry
                        .gauge_create(&d.namespace, &d.subsystem, &d.name, &d.help, &d.label_keys)
                        .unwrap(),
                ),
                other => panic!("unsupported instrument kind: {other}"),
            })
            .collect();

        for op in &self.ops {
            let res = match (&instruments[op.metric], op.op.as_str()) {
                (Instrument::Counter(c), "inc") => c.inc(op.ts, &op.labels),
                (Instrument::Counter(c), "add") => c.add(op.ts, &op.labels, op.value),
                (Instrument::Counter(c), "set") => c.set(op.ts, &op.labels, op.value),
                (Instrument::Gauge(g), "inc") => g.inc(op.ts, &op.labels),
                (Instrument::Gauge(g), "dec") => g.dec(op.ts, &op.labels),
                (Instrument::Gauge(g), "add") => g.add(op.ts, &op.labels, op.value),
                (Instrument::Gauge(g), "sub") => g.sub(op.ts, &op.labels, op.value),
                (Instrument::Gauge(g), "set") => g.set(op.ts, &op.labels, op.value),
                (_, other) => panic!("unsupported op: {other}"),
            };
            res.unwrap();
        }

        registry
    }
}
