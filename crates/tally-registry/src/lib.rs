//! tally registry: concurrent counter/gauge storage and snapshot export.
//!
//! Application code creates instruments through a [`Registry`] and mutates
//! them from any thread. Exporters call one of the `encode_*` methods, which
//! copy a [`tally_core::Snapshot`] out of the live instruments and render it
//! without holding any instrument lock.
//!
//! All synchronization is internal. Series live in `DashMap`s, and every
//! mutation happens under the owning shard's write lock, so a series value and
//! its timestamp are always read and written as one pair.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod counter;
pub mod gauge;
mod metric;
pub mod registry;

pub use counter::Counter;
pub use gauge::Gauge;
pub use registry::Registry;
pub use tally_core::{ErrorKind, MetricsError, Result};
