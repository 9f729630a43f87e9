#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

mod common;
use common::{init_tracing, TS};

use tally_core::encode::decode_compact;
use tally_registry::{ErrorKind, Registry};

const THREADS: usize = 256;
const ROUNDS: usize = 200;

#[test]
fn concurrent_counter_updates_are_not_lost() {
    init_tracing();
    let r = Registry::new();
    let c = r.counter_create("", "", "hits_total", "h", &["route"]).unwrap();

    thread::scope(|s| {
        for i in 0..THREADS {
            let c = c.clone();
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    if i % 2 == 0 {
                        c.inc(TS, &["/"]).unwrap();
                    } else {
                        c.add(TS, &["/"], 2.0).unwrap();
                    }
                }
            });
        }
    });

    let expected = (THREADS / 2 * ROUNDS) as f64 * 3.0;
    assert_eq!(c.get_val(&["/"]).unwrap(), expected);
}

#[test]
fn concurrent_gauge_deltas_sum_up() {
    let r = Registry::new();
    let g = r.gauge_create("", "", "balance", "h", &["acct"]).unwrap();

    thread::scope(|s| {
        for i in 0..THREADS {
            let g = g.clone();
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    match i % 4 {
                        0 => g.inc(TS, &["x"]).unwrap(),
                        1 => g.dec(TS, &["x"]).unwrap(),
                        2 => g.add(TS, &["x"], 3.0).unwrap(),
                        _ => g.sub(TS, &["x"], 1.0).unwrap(),
                    }
                }
            });
        }
    });

    // Per group of four threads: +1 -1 +3 -1 = +2.
    let expected = (THREADS / 4 * ROUNDS) as f64 * 2.0;
    assert_eq!(g.get_val(&["x"]).unwrap(), expected);
}

#[test]
fn racing_first_mutation_creates_one_series() {
    let r = Registry::new();
    let c = r.counter_create("", "", "first_total", "h", &["k"]).unwrap();

    for round in 0..20 {
        let label = format!("fresh-{round}");
        thread::scope(|s| {
            for _ in 0..64 {
                let c = c.clone();
                let label = label.as_str();
                s.spawn(move || c.inc(TS, &[label]).unwrap());
            }
        });
        assert_eq!(c.get_val(&[label.as_str()]).unwrap(), 64.0);
    }

    let snap = r.enumerate().unwrap();
    assert_eq!(snap.metrics[0].series.len(), 20);
}

#[test]
fn value_and_timestamp_stay_paired() {
    // Every writer stores value == timestamp; a torn read would break that.
    let r = Registry::new();
    let g = r.gauge_create("", "", "paired", "h", &["k"]).unwrap();
    g.set(0, &["a"], 0.0).unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        for w in 0..8u64 {
            let g = g.clone();
            s.spawn(move || {
                for i in 0..2_000u64 {
                    let ts = i * 8 + w;
                    g.set(ts, &["a"], ts as f64).unwrap();
                }
            });
        }
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                let snap = r.enumerate().unwrap();
                let sample = &snap.metrics[0].series[0];
                assert_eq!(sample.value, sample.timestamp_ns as f64);
                thread::yield_now();
            }
        });

        thread::sleep(Duration::from_millis(50));
        done.store(true, Ordering::Relaxed);
    });
}

#[test]
fn encoding_while_instruments_are_created() {
    let r = Registry::new();
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..300 {
                let c = r
                    .counter_create("", "churn", &format!("m{i}"), "h", &["k"])
                    .unwrap();
                c.inc(TS, &["a"]).unwrap();
                c.inc(TS, &["b"]).unwrap();
            }
            stop.store(true, Ordering::Relaxed);
        });

        s.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                let text = r.encode_prometheus().unwrap();
                assert!(text
                    .lines()
                    .all(|l| l.starts_with("# ") || l.starts_with("churn_m")));

                let bytes = r.encode_compact_binary().unwrap();
                let snap = decode_compact(&bytes).unwrap();
                let mut last = None;
                for m in &snap.metrics {
                    let idx: usize = m.identity.name.trim_start_matches('m').parse().unwrap();
                    assert!(last.map_or(true, |prev| idx > prev), "registration order");
                    last = Some(idx);
                    assert!(m.series.len() <= 2);
                    assert!(m.series.iter().all(|s| s.value == 1.0));
                }
            }
        });
    });

    assert_eq!(r.len(), 300);
}

#[test]
fn encode_racing_destroy_is_complete_or_fails() {
    const METRICS: usize = 100;
    const SERIES: usize = 30;

    for delay_us in (0..1_200).step_by(60) {
        let r = Registry::new();
        for i in 0..METRICS {
            let c = r.counter_create("", "", &format!("m{i}"), "h", &["k"]).unwrap();
            for j in 0..SERIES {
                c.inc(TS, &[format!("v{j}")]).unwrap();
            }
        }
        let barrier = Barrier::new(2);

        thread::scope(|s| {
            let encoder = s.spawn(|| {
                barrier.wait();
                r.encode_compact_binary()
            });
            s.spawn(|| {
                barrier.wait();
                thread::sleep(Duration::from_micros(delay_us));
                r.destroy();
            });

            match encoder.join().unwrap() {
                Ok(bytes) => {
                    let snap = decode_compact(&bytes).unwrap();
                    assert_eq!(snap.metrics.len(), METRICS, "delay={delay_us}us");
                    for m in &snap.metrics {
                        assert_eq!(m.series.len(), SERIES, "delay={delay_us}us {}", m.fqname());
                    }
                }
                Err(e) => assert_eq!(e.kind(), ErrorKind::RegistryDestroyed),
            }
        });
    }
}
