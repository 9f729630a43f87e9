#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;
use common::{init_tracing, TS};

use tally_registry::{ErrorKind, Registry};

#[test]
fn identical_create_is_idempotent() {
    init_tracing();
    let r = Registry::new();
    let a = r.counter_create("app", "db", "queries_total", "Queries.", &["op"]).unwrap();
    let b = r.counter_create("app", "db", "queries_total", "Queries.", &["op"]).unwrap();

    a.inc(TS, &["select"]).unwrap();
    b.inc(TS, &["select"]).unwrap();
    assert_eq!(a.get_val(&["select"]).unwrap(), 2.0);
    assert_eq!(r.len(), 1);
}

#[test]
fn conflicting_create_is_duplicate_identity() {
    let r = Registry::new();
    r.gauge_create("app", "db", "pool", "Pool size.", &["name"]).unwrap();

    let keys = r.gauge_create("app", "db", "pool", "Pool size.", &["name", "region"]);
    assert_eq!(keys.unwrap_err().kind(), ErrorKind::DuplicateIdentity);

    let help = r.gauge_create("app", "db", "pool", "Other help.", &["name"]);
    assert_eq!(help.unwrap_err().kind(), ErrorKind::DuplicateIdentity);

    assert_eq!(r.len(), 1);
}

#[test]
fn everything_fails_after_destroy() {
    init_tracing();
    let r = Registry::new();
    let c = r.counter_create("", "", "c", "h", &["k"]).unwrap();
    let g = r.gauge_create("", "", "g", "h", &["k"]).unwrap();
    c.inc(TS, &["a"]).unwrap();
    g.set(TS, &["a"], 1.0).unwrap();

    let other = r.clone();
    r.destroy();
    assert!(other.is_destroyed());
    assert!(r.is_empty());

    let destroyed = |res: tally_registry::Result<()>| {
        assert_eq!(res.unwrap_err().kind(), ErrorKind::RegistryDestroyed);
    };
    destroyed(c.inc(TS, &["a"]));
    destroyed(c.add(TS, &["a"], 1.0));
    destroyed(c.add(TS, &["a"], -1.0));
    destroyed(c.set(TS, &["a"], 1.0));
    destroyed(g.inc(TS, &["a"]));
    destroyed(g.dec(TS, &["a"]));
    destroyed(g.add(TS, &["a"], 1.0));
    destroyed(g.sub(TS, &["a"], 1.0));
    destroyed(g.set(TS, &["a"], 1.0));
    destroyed(c.get_val(&["a"]).map(|_| ()));
    destroyed(g.get_val(&["a"]).map(|_| ()));

    destroyed(other.encode_prometheus().map(|_| ()));
    destroyed(other.encode_text().map(|_| ()));
    destroyed(other.encode_compact_binary().map(|_| ()));
    destroyed(other.enumerate().map(|_| ()));
    destroyed(other.counter_create::<&str>("", "", "new", "h", &[]).map(|_| ()));

    // Second destroy is a no-op.
    r.destroy();
}

#[test]
fn identities_joining_to_one_name_conflict() {
    let r = Registry::new();
    let c = r.counter_create::<&str>("http", "server", "requests", "Requests.", &[]).unwrap();
    c.inc(TS, &[] as &[&str]).unwrap();

    let err = r
        .gauge_create::<&str>("http", "", "server_requests", "Requests.", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateIdentity);

    // Same kind and signature, different split: still a different identity.
    let err = r
        .counter_create::<&str>("", "http", "server_requests", "Requests.", &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateIdentity);

    let out = r.encode_prometheus().unwrap();
    assert_eq!(out.matches("# TYPE http_server_requests ").count(), 1, "{out}");
    assert_eq!(r.len(), 1);
}
