//! Column projection: resolving requested columns against a snapshot.
//!
//! Column specs come from configuration as `name[:unit]` entries and are
//! resolved lazily every cycle. Resolution probes the metric types in a
//! fixed order; a name matching more than one type is a configuration
//! defect and is reported as [`ProjectError::AmbiguousColumn`] rather than
//! silently picking one.

use tracing::warn;

use crate::fmt::render_value;
use crate::metrics::{CoercedValue, MetricKey, MetricType, Snapshot};

/// One user-requested column: a metric name and an optional forced unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub unit: Option<String>,
}

impl ColumnSpec {
    /// Parses one `name[:unit]` entry.
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(':') {
            Some((name, unit)) => Self {
                name: name.trim().to_string(),
                unit: Some(unit.trim().to_string()),
            },
            None => Self {
                name: entry.trim().to_string(),
                unit: None,
            },
        }
    }

    /// Parses a comma-separated column list, skipping empty entries.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Error raised when a requested name matches more than one metric type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    AmbiguousColumn(String),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::AmbiguousColumn(name) => {
                write!(f, "column '{}' matches more than one metric type", name)
            }
        }
    }
}

impl std::error::Error for ProjectError {}

/// Placeholder rendered when a forced unit or an ambiguous name makes a
/// value unrenderable. The column keeps its slot so the remaining columns
/// still line up.
const ERROR_MARKER: &str = "?";

/// One rendered column: header text plus value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub header: String,
    pub text: String,
}

/// Resolves a name against the snapshot, probing types in fixed order.
///
/// Returns `Ok(None)` when no key matches, `Err` when several do.
fn resolve<'a>(
    snapshot: &'a Snapshot,
    name: &str,
) -> Result<Option<(MetricType, &'a CoercedValue)>, ProjectError> {
    if snapshot.count_by_name(name) > 1 {
        return Err(ProjectError::AmbiguousColumn(name.to_string()));
    }
    for kind in MetricType::PROBE_ORDER {
        if let Some(value) = snapshot.get(name, kind) {
            return Ok(Some((kind, value)));
        }
    }
    Ok(None)
}

/// Projects the requested columns against a snapshot, preserving request
/// order.
///
/// Per-column failures never abort the projection: an unknown name is
/// reported and dropped, an invalid forced unit or an ambiguous name is
/// reported and rendered as the error marker.
pub fn project(snapshot: &Snapshot, columns: &[ColumnSpec]) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(columns.len());

    for spec in columns {
        let resolved = match resolve(snapshot, &spec.name) {
            Ok(r) => r,
            Err(e) => {
                warn!("{}", e);
                cells.push(Cell {
                    header: spec.name.clone(),
                    text: ERROR_MARKER.to_string(),
                });
                continue;
            }
        };

        let Some((kind, value)) = resolved else {
            warn!("unknown column '{}' dropped", spec.name);
            continue;
        };

        let text = match render_value(value, kind, spec.unit.as_deref()) {
            Ok(text) => text,
            Err(e) => {
                warn!("column '{}': {}", spec.name, e);
                ERROR_MARKER.to_string()
            }
        };

        cells.push(Cell {
            header: spec.name.clone(),
            text,
        });
    }

    cells
}

/// A requested column that cannot resolve cleanly against the declared
/// key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnIssue {
    Unknown(String),
    Ambiguous { name: String, matches: usize },
}

/// Validates requested columns against the statically declared key set.
///
/// Called once at startup so typos are reported before the first cycle
/// instead of silently vanishing from the table. Each issue is logged and
/// also returned for callers that want to inspect them.
pub fn validate_columns(columns: &[ColumnSpec], declared: &[MetricKey]) -> Vec<ColumnIssue> {
    let mut issues = Vec::new();
    for spec in columns {
        let matches = declared.iter().filter(|k| k.name == spec.name).count();
        match matches {
            0 => {
                warn!("unknown column '{}': not a declared metric", spec.name);
                issues.push(ColumnIssue::Unknown(spec.name.clone()));
            }
            1 => {}
            _ => {
                warn!(
                    "ambiguous column '{}': declared with {} metric types",
                    spec.name, matches
                );
                issues.push(ColumnIssue::Ambiguous {
                    name: spec.name.clone(),
                    matches,
                });
            }
        }
    }
    issues
}

/// Width of one rendered column: the longer of header and value, plus fixed
/// padding.
pub fn column_width(header: &str, value: &str) -> usize {
    header.len().max(value.len()) + 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricKey, MetricType, RawSection, assemble};

    const KEYS: &[MetricKey] = &[
        MetricKey::new("Name", MetricType::Label),
        MetricKey::new("VirtCapUsed", MetricType::Size),
        MetricKey::new("VirtCapFree", MetricType::Size),
    ];

    fn snapshot() -> Snapshot {
        assemble(&[RawSection {
            source_id: "test",
            keys: KEYS,
            values: vec![
                "amalgm".to_string(),
                "100".to_string(),
                "300".to_string(),
            ],
        }])
        .unwrap()
    }

    #[test]
    fn parse_entry_with_and_without_unit() {
        assert_eq!(
            ColumnSpec::parse("VirtCapUsed:G"),
            ColumnSpec {
                name: "VirtCapUsed".to_string(),
                unit: Some("G".to_string()),
            }
        );
        assert_eq!(
            ColumnSpec::parse("Name"),
            ColumnSpec {
                name: "Name".to_string(),
                unit: None,
            }
        );
    }

    #[test]
    fn parse_list_preserves_order() {
        let specs = ColumnSpec::parse_list("Name, VirtCapUsed:G,VirtCapFree");
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Name", "VirtCapUsed", "VirtCapFree"]);
    }

    #[test]
    fn derived_percentage_projects_end_to_end() {
        let cells = project(&snapshot(), &ColumnSpec::parse_list("VirtCapUsedPerc"));
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].header, "VirtCapUsedPerc");
        assert_eq!(cells[0].text, "25%");
    }

    #[test]
    fn forced_unit_is_honored() {
        let snapshot = snapshot();
        let cells = project(&snapshot, &ColumnSpec::parse_list("VirtCapTot:K"));
        // 400 bytes forced to K rounds down to 0K.
        assert_eq!(cells[0].text, "0K");
    }

    #[test]
    fn unknown_column_is_dropped() {
        let snapshot = snapshot();
        let cells = project(&snapshot, &ColumnSpec::parse_list("Name,NoSuchMetric"));
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].header, "Name");
    }

    #[test]
    fn invalid_forced_unit_renders_error_marker() {
        let snapshot = snapshot();
        let cells = project(&snapshot, &ColumnSpec::parse_list("VirtCapUsed:flargs,Name"));
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].text, "?");
        assert_eq!(cells[1].text, "amalgm");
    }

    #[test]
    fn ambiguous_name_renders_error_marker() {
        const DUP_KEYS: &[MetricKey] = &[
            MetricKey::new("Wait", MetricType::Size),
            MetricKey::new("Wait", MetricType::Duration),
        ];
        let snapshot = assemble(&[RawSection {
            source_id: "test",
            keys: DUP_KEYS,
            values: vec!["1".to_string(), "2".to_string()],
        }])
        .unwrap();
        let cells = project(&snapshot, &ColumnSpec::parse_list("Wait"));
        assert_eq!(cells[0].text, "?");
    }

    #[test]
    fn startup_validation_flags_unknown_and_ambiguous_names() {
        const DECLARED: &[MetricKey] = &[
            MetricKey::new("Name", MetricType::Label),
            MetricKey::new("Wait", MetricType::Size),
            MetricKey::new("Wait", MetricType::Duration),
        ];
        let columns = ColumnSpec::parse_list("Name,NoSuchMetric,Wait");
        let issues = validate_columns(&columns, DECLARED);
        assert_eq!(
            issues,
            vec![
                ColumnIssue::Unknown("NoSuchMetric".to_string()),
                ColumnIssue::Ambiguous {
                    name: "Wait".to_string(),
                    matches: 2,
                },
            ]
        );
    }

    #[test]
    fn startup_validation_accepts_clean_columns() {
        const DECLARED: &[MetricKey] = &[MetricKey::new("Name", MetricType::Label)];
        assert!(validate_columns(&ColumnSpec::parse_list("Name"), DECLARED).is_empty());
    }

    #[test]
    fn width_is_longest_text_plus_padding() {
        assert_eq!(column_width("Name", "amalgm"), 8);
        assert_eq!(column_width("VirtCapUsedPerc", "25%"), 17);
    }
}
