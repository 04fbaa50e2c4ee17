//! telemetry/mod.rs
//! Per-handle counters and immutable snapshots.
//!
//! Notes:
//! - Counters are atomics because one handle is shared by many sessions.
//! - Snapshots are plain data, serialisable for logs and bindings.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
