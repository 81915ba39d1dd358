//! poolstat - periodic ZFS pool metric monitor library.
//!
//! The pipeline each refresh cycle: the collector fetches ordered raw text
//! fields from the pool commands, the metrics module coerces and assembles
//! them into a typed snapshot, the view module projects the requested
//! columns through the per-type formatters, and the tui module renders the
//! aligned header/value rows.

pub mod collector;
pub mod fmt;
pub mod metrics;
pub mod tui;
pub mod view;
