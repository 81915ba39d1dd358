//! Snapshot assembly: positional zipping of raw fields plus derived metrics.

use super::coerce::coerce;
use super::{AssembleError, CoercedValue, MetricKey, MetricType};

/// Raw fields from one command source, paired with its declared keys.
#[derive(Debug, Clone)]
pub struct RawSection {
    pub source_id: &'static str,
    pub keys: &'static [MetricKey],
    pub values: Vec<String>,
}

/// One point-in-time collection of typed metric values.
///
/// Ordered: base metrics in source declaration order, derived metrics
/// appended after. Rebuilt from scratch every refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Vec<(MetricKey, CoercedValue)>,
}

impl Snapshot {
    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(MetricKey, CoercedValue)> {
        self.entries.iter()
    }

    /// Looks up a value by exact `(name, kind)` identity.
    pub fn get(&self, name: &str, kind: MetricType) -> Option<&CoercedValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.name == name && k.kind == kind)
            .map(|(_, v)| v)
    }

    /// Number of entries matching `name` regardless of type.
    pub fn count_by_name(&self, name: &str) -> usize {
        self.entries.iter().filter(|(k, _)| k.name == name).count()
    }

    fn push(&mut self, key: MetricKey, value: CoercedValue) {
        self.entries.push((key, value));
    }

    /// Numeric value of a base metric by name, `None` for pass-through text
    /// or a missing key.
    fn num(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.name == name)
            .and_then(|(_, v)| v.as_num())
    }
}

/// Derived metric keys, in computation order. Each formula only references
/// keys already present when it runs.
const VIRT_CAP_TOT: MetricKey = MetricKey::new("VirtCapTot", MetricType::Size);
const VIRT_CAP_USED_PERC: MetricKey = MetricKey::new("VirtCapUsedPerc", MetricType::Percentage);
const VIRT_COMP_PERC: MetricKey = MetricKey::new("VirtCompPerc", MetricType::Percentage);
const TOTALWAIT_BOTH: MetricKey = MetricKey::new("TotalwaitBoth", MetricType::Duration);
const STATE_FRAG_PERC: MetricKey = MetricKey::new("StateFragPerc", MetricType::Percentage);

/// Derived keys in computation order, exposed so startup validation can see
/// the full declared key set.
pub const DERIVED_KEYS: [MetricKey; 5] = [
    VIRT_CAP_TOT,
    VIRT_CAP_USED_PERC,
    VIRT_COMP_PERC,
    TOTALWAIT_BOTH,
    STATE_FRAG_PERC,
];

/// Builds a snapshot from the raw sections of all sources.
///
/// Each section's declared keys are zipped positionally against its fields;
/// a length mismatch means every following key would be silently paired with
/// the wrong value, so it fails with [`AssembleError::SchemaMismatch`]
/// instead of producing a desynchronized snapshot.
pub fn assemble(sections: &[RawSection]) -> Result<Snapshot, AssembleError> {
    let mut snapshot = Snapshot::default();

    for section in sections {
        if section.keys.len() != section.values.len() {
            return Err(AssembleError::SchemaMismatch {
                source_id: section.source_id,
                expected: section.keys.len(),
                got: section.values.len(),
            });
        }
        for (key, raw) in section.keys.iter().zip(&section.values) {
            snapshot.push(*key, coerce(raw));
        }
    }

    derive(&mut snapshot);
    Ok(snapshot)
}

/// Value used when a derived formula cannot be computed (an operand is
/// unavailable, or a ratio divides by zero).
const NOT_AVAILABLE: &str = "n/a";

fn not_available() -> CoercedValue {
    CoercedValue::Text(NOT_AVAILABLE.to_string())
}

/// Computes the derived metrics and appends them in declared order.
fn derive(snapshot: &mut Snapshot) {
    let tot = match (snapshot.num("VirtCapUsed"), snapshot.num("VirtCapFree")) {
        (Some(used), Some(free)) => {
            let tot = used + free;
            snapshot.push(VIRT_CAP_TOT, CoercedValue::Num(tot));
            Some(tot)
        }
        _ => {
            snapshot.push(VIRT_CAP_TOT, not_available());
            None
        }
    };

    let used_perc = match (snapshot.num("VirtCapUsed"), tot) {
        (Some(_), Some(tot)) if tot == 0.0 => not_available(),
        (Some(used), Some(tot)) => CoercedValue::Num(used / tot),
        _ => not_available(),
    };
    snapshot.push(VIRT_CAP_USED_PERC, used_perc);

    let comp_perc = match snapshot.num("VirtCompRatio") {
        Some(ratio) => CoercedValue::Num(ratio - 1.0),
        None => not_available(),
    };
    snapshot.push(VIRT_COMP_PERC, comp_perc);

    let wait_both = match (
        snapshot.num("TotalwaitRead"),
        snapshot.num("TotalwaitWrite"),
    ) {
        (Some(r), Some(w)) => CoercedValue::Num(r + w),
        _ => not_available(),
    };
    snapshot.push(TOTALWAIT_BOTH, wait_both);

    // StateFrag arrives as a raw percent number ("20%" coerced to 20).
    let frag_perc = match snapshot.num("StateFrag") {
        Some(raw) => CoercedValue::Num(raw * 0.01),
        None => not_available(),
    };
    snapshot.push(STATE_FRAG_PERC, frag_perc);
}
