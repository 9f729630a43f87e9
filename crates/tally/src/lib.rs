//! Top-level facade crate for tally.
//!
//! Re-exports the core data model and the registry so users can depend on a
//! single crate.

pub mod core {
    pub use tally_core::*;
}

pub mod registry {
    pub use tally_registry::*;
}

pub use tally_core::{ErrorKind, MetricsError, Result, Snapshot};
pub use tally_registry::{Counter, Gauge, Registry};
