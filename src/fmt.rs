//! Unit conversion: per-type formatters turning coerced values into display
//! text.
//!
//! All functions here are pure. Pass-through rules: text values (labels, the
//! `"-"` sentinel, `"n/a"`) are returned unchanged by every formatter, and
//! size/duration treat a numeric 0 the same way. Percentage is the
//! exception: 0 is a legitimate percentage and renders as `"0%"`.

use crate::metrics::{CoercedValue, MetricType};

/// Error for an unrecognized forced display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    InvalidUnit(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidUnit(unit) => write!(f, "invalid display unit '{}'", unit),
        }
    }
}

impl std::error::Error for FormatError {}

/// Base-1024 size units, 1024x apart.
const SIZE_UNITS: [&str; 7] = ["B", "K", "M", "G", "T", "P", "E"];

/// Duration units and their thresholds in microseconds, coarsest first.
const DURATION_UNITS: [(&str, f64); 6] = [
    ("d", 8.64e10),
    ("h", 3.6e9),
    ("m", 6e7),
    ("s", 1e6),
    ("ms", 1e3),
    ("us", 1.0),
];

/// Tolerance for floating rounding at exact unit boundaries.
const BOUNDARY_EPSILON: f64 = 1e-4;

/// Renders one snapshot value for display, honoring an optional forced unit.
///
/// This is the single dispatch point the column projector uses: it applies
/// the pass-through rules and selects the formatter by metric type.
pub fn render_value(
    value: &CoercedValue,
    kind: MetricType,
    unit: Option<&str>,
) -> Result<String, FormatError> {
    let v = match value {
        CoercedValue::Text(s) => return Ok(s.clone()),
        CoercedValue::Num(v) => *v,
    };

    match kind {
        MetricType::Label | MetricType::Percentage if unit.is_some() => {
            // Only size and duration columns have display units to force.
            Err(FormatError::InvalidUnit(unit.unwrap_or_default().to_string()))
        }
        MetricType::Label => Ok(format_plain(v)),
        MetricType::Percentage => Ok(format_percentage(v)),
        MetricType::Size if v == 0.0 => Ok(format_plain(v)),
        MetricType::Size => format_size(v, unit, 0),
        MetricType::Duration if v == 0.0 => Ok(format_plain(v)),
        MetricType::Duration => format_duration(v, unit),
    }
}

/// Renders a numeric value with no scaling, dropping a trailing `.0`.
fn format_plain(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Formats a byte count with base-1024 scaling.
///
/// Automatic mode picks the largest unit index `i` with `v / 1024^i >= 1`,
/// clamped to the unit table; manual mode divides by the requested unit and
/// fails with [`FormatError::InvalidUnit`] for anything not in B..E.
pub fn format_size(v: f64, unit: Option<&str>, decimals: usize) -> Result<String, FormatError> {
    let index = match unit {
        Some(u) => SIZE_UNITS
            .iter()
            .position(|s| s.eq_ignore_ascii_case(u))
            .ok_or_else(|| FormatError::InvalidUnit(u.to_string()))?,
        None => {
            let mut i = 0;
            while i + 1 < SIZE_UNITS.len() && v / 1024f64.powi(i as i32 + 1) >= 1.0 {
                i += 1;
            }
            i
        }
    };

    // Round half away from zero; "{:.*}" alone would round ties to even.
    let factor = 10f64.powi(decimals as i32);
    let scaled = (v / 1024f64.powi(index as i32) * factor).round() / factor;
    Ok(format!("{:.*}{}", decimals, scaled, SIZE_UNITS[index]))
}

/// Formats a microsecond count with mixed-radix time scaling.
///
/// Automatic mode scans from the coarsest unit down and takes the first one
/// whose threshold the value meets (within [`BOUNDARY_EPSILON`]). If the
/// value then rounds up to the next coarser unit's threshold (59,999,999us
/// would display as "60s"), the coarser unit is promoted to instead ("1m");
/// promotion cascades until the rounded value stays below the next boundary.
pub fn format_duration(v: f64, unit: Option<&str>) -> Result<String, FormatError> {
    if let Some(u) = unit {
        let (suffix, threshold) = DURATION_UNITS
            .iter()
            .copied()
            .find(|(s, _)| s.eq_ignore_ascii_case(u))
            .ok_or_else(|| FormatError::InvalidUnit(u.to_string()))?;
        return Ok(format!("{:.0}{}", (v / threshold).round(), suffix));
    }

    let mut index = DURATION_UNITS
        .iter()
        .position(|(_, t)| v >= t * (1.0 - BOUNDARY_EPSILON))
        .unwrap_or(DURATION_UNITS.len() - 1);

    loop {
        let (suffix, threshold) = DURATION_UNITS[index];
        let rounded = (v / threshold).round();
        if index == 0 {
            return Ok(format!("{:.0}{}", rounded, suffix));
        }
        let (_, coarser) = DURATION_UNITS[index - 1];
        if rounded * threshold >= coarser * (1.0 - BOUNDARY_EPSILON) {
            index -= 1;
            continue;
        }
        return Ok(format!("{:.0}{}", rounded, suffix));
    }
}

/// Formats a ratio in [0, 1] as a whole-number percentage.
pub fn format_percentage(ratio: f64) -> String {
    format!("{:.0}%", (ratio * 100.0).round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CoercedValue, MetricType};

    #[test]
    fn size_auto_picks_largest_fitting_unit() {
        assert_eq!(format_size(1073741824.0, None, 0).unwrap(), "1G");
        assert_eq!(format_size(512.0, None, 0).unwrap(), "512B");
        assert_eq!(format_size(1536.0, None, 0).unwrap(), "2K");
        assert_eq!(format_size(51567724367872.0, None, 0).unwrap(), "47T");
    }

    #[test]
    fn size_auto_clamps_to_exabytes() {
        let huge = 1024f64.powi(7);
        assert_eq!(format_size(huge, None, 0).unwrap(), "1024E");
    }

    #[test]
    fn size_manual_divides_by_requested_unit() {
        assert_eq!(format_size(1073741824.0, Some("M"), 0).unwrap(), "1024M");
        assert_eq!(format_size(1073741824.0, Some("K"), 0).unwrap(), "1048576K");
        assert_eq!(format_size(10240.0, Some("k"), 0).unwrap(), "10K");
    }

    #[test]
    fn size_manual_rejects_unknown_unit() {
        assert_eq!(
            format_size(1.0, Some("Q"), 0),
            Err(FormatError::InvalidUnit("Q".to_string()))
        );
    }

    #[test]
    fn size_honors_decimal_places() {
        assert_eq!(format_size(1536.0, None, 1).unwrap(), "1.5K");
    }

    #[test]
    fn halfway_values_round_up_not_to_even() {
        // 2560 / 1024 = 2.5 exactly.
        assert_eq!(format_size(2560.0, Some("K"), 0).unwrap(), "3K");
        assert_eq!(format_size(2560.0, None, 0).unwrap(), "3K");
        // 2,500,000us / 1e6 = 2.5s exactly.
        assert_eq!(format_duration(2_500_000.0, Some("s")).unwrap(), "3s");
        assert_eq!(format_percentage(0.125), "13%");
    }

    #[test]
    fn duration_auto_scales() {
        assert_eq!(format_duration(1_000_000.0, None).unwrap(), "1s");
        assert_eq!(format_duration(1500.0, None).unwrap(), "2ms");
        assert_eq!(format_duration(15682379.0, None).unwrap(), "16s");
        assert_eq!(format_duration(0.5, None).unwrap(), "1us");
    }

    #[test]
    fn duration_rounding_promotes_to_coarser_unit() {
        // 59,999,999us rounds to 60s at the second scale; the promotion rule
        // displays it as 1m instead.
        assert_eq!(format_duration(59_999_999.0, None).unwrap(), "1m");
        // Promotion cascades: 23h59m59.9s worth of us becomes 1d.
        assert_eq!(format_duration(86_399_900_000.0, None).unwrap(), "1d");
        // Just below the promotion point stays at the finer unit.
        assert_eq!(format_duration(59_000_000.0, None).unwrap(), "59s");
    }

    #[test]
    fn duration_boundary_tolerates_float_rounding() {
        // Exactly one minute, reconstructed through lossy arithmetic.
        let almost_minute = 6e7 * (1.0 - 5e-5);
        assert_eq!(format_duration(almost_minute, None).unwrap(), "1m");
    }

    #[test]
    fn duration_manual_divides_by_requested_unit() {
        assert_eq!(format_duration(1_000_000.0, Some("ms")).unwrap(), "1000ms");
        assert_eq!(format_duration(90_000_000.0, Some("s")).unwrap(), "90s");
    }

    #[test]
    fn duration_manual_rejects_unknown_unit() {
        assert_eq!(
            format_duration(1.0, Some("weeks")),
            Err(FormatError::InvalidUnit("weeks".to_string()))
        );
    }

    #[test]
    fn percentage_renders_whole_numbers() {
        assert_eq!(format_percentage(0.2034), "20%");
        assert_eq!(format_percentage(0.25), "25%");
        assert_eq!(format_percentage(1.0), "100%");
    }

    #[test]
    fn percentage_zero_is_not_pass_through() {
        assert_eq!(format_percentage(0.0), "0%");
        assert_eq!(
            render_value(&CoercedValue::Num(0.0), MetricType::Percentage, None).unwrap(),
            "0%"
        );
    }

    #[test]
    fn zero_and_text_pass_through_for_size_and_duration() {
        assert_eq!(
            render_value(&CoercedValue::Num(0.0), MetricType::Size, None).unwrap(),
            "0"
        );
        assert_eq!(
            render_value(&CoercedValue::Num(0.0), MetricType::Duration, None).unwrap(),
            "0"
        );
        assert_eq!(
            render_value(
                &CoercedValue::Text("-".to_string()),
                MetricType::Duration,
                None
            )
            .unwrap(),
            "-"
        );
    }

    #[test]
    fn labels_render_plain() {
        assert_eq!(
            render_value(&CoercedValue::Num(16.0), MetricType::Label, None).unwrap(),
            "16"
        );
        assert_eq!(
            render_value(
                &CoercedValue::Text("ONLINE".to_string()),
                MetricType::Label,
                None
            )
            .unwrap(),
            "ONLINE"
        );
    }

    #[test]
    fn forced_unit_on_unscaled_type_is_invalid() {
        assert_eq!(
            render_value(&CoercedValue::Num(0.5), MetricType::Percentage, Some("K")),
            Err(FormatError::InvalidUnit("K".to_string()))
        );
    }

    #[test]
    fn manual_unit_round_trips_within_rounding() {
        let original = 51567724367872.0;
        let text = format_size(original, Some("G"), 0).unwrap();
        let parsed: f64 = text.strip_suffix('G').unwrap().parse().unwrap();
        let recovered = parsed * 1024f64.powi(3);
        assert!((recovered - original).abs() <= 1024f64.powi(3));
    }
}
