//! Typed metric model: metric keys, coerced values and snapshots.
//!
//! A pool snapshot is an ordered collection of `(MetricKey, CoercedValue)`
//! pairs built positionally from the raw fields each command source returns,
//! plus a fixed set of derived metrics computed from the base values.

mod coerce;
mod snapshot;

pub use coerce::coerce;
pub use snapshot::{DERIVED_KEYS, RawSection, Snapshot, assemble};

/// Classification attached to every metric key. Selects the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Byte count, base-1024 scaling (B, K, M, G, T, P, E).
    Size,
    /// Microsecond count, mixed-radix time scaling (us..d).
    Duration,
    /// A ratio in [0, 1], rendered as a whole-number percentage.
    Percentage,
    /// Opaque text or a plain count, no scaling.
    Label,
}

impl MetricType {
    /// Fixed order in which column resolution probes the types.
    pub const PROBE_ORDER: [MetricType; 4] = [
        MetricType::Size,
        MetricType::Duration,
        MetricType::Percentage,
        MetricType::Label,
    ];
}

/// Identity of one metric: its name and its type.
///
/// Within one snapshot no two entries share the same `(name, kind)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricKey {
    pub name: &'static str,
    pub kind: MetricType,
}

impl MetricKey {
    pub const fn new(name: &'static str, kind: MetricType) -> Self {
        Self { name, kind }
    }
}

/// Result of coercing one raw field.
///
/// Numeric fields become `Num`; labels, the unavailable-data sentinel (`-`)
/// and anything that fails to parse stay `Text` and pass through every
/// formatter unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    Num(f64),
    Text(String),
}

impl CoercedValue {
    /// Returns the numeric value, or `None` for pass-through text.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            CoercedValue::Num(v) => Some(*v),
            CoercedValue::Text(_) => None,
        }
    }
}

/// Error raised when a source's field count does not match its declared keys.
#[derive(Debug, Clone)]
pub enum AssembleError {
    /// A source returned a different number of fields than it declares.
    /// Positional zipping would silently desynchronize every following key,
    /// so the whole cycle is aborted.
    SchemaMismatch {
        source_id: &'static str,
        expected: usize,
        got: usize,
    },
}

impl std::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssembleError::SchemaMismatch {
                source_id,
                expected,
                got,
            } => write!(
                f,
                "schema mismatch in '{}': declared {} fields, got {}",
                source_id, expected, got
            ),
        }
    }
}

impl std::error::Error for AssembleError {}
