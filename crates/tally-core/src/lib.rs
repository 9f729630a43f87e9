//! tally core: label identity, snapshot data model, and wire formats.
//!
//! This crate defines the data contracts shared by the concurrent registry and
//! by anything that consumes an exported payload. It carries no locking or
//! config dependencies: every encoder here is a pure function of a
//! [`snapshot::Snapshot`].
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed payloads and caller mistakes surface as `MetricsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod encode;
pub mod error;
pub mod labels;
pub mod snapshot;

/// Shared result type.
pub use error::{ErrorKind, MetricsError, Result};
pub use labels::{LabelSet, SeriesKey};
pub use snapshot::{Identity, MetricKind, MetricSnapshot, Sample, Snapshot};
