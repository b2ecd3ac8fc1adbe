//! Signal definitions
//!
//! This module contains the signal definition types and the static
//! per-identifier signal table.

pub mod spec;
pub mod table;

// Re-export key types for convenience
pub use spec::{Field, MessageSpec, SignalSpec, Transform, ValueType};
pub use table::{message_spec, stats, TableStats, SIGNAL_TABLE};
