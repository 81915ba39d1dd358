//! Raw field coercion.

use super::CoercedValue;

/// Marker the pool commands print for data that is not available.
pub(crate) const UNAVAILABLE: &str = "-";

/// Coerces one raw text field into a numeric value or pass-through text.
///
/// A leading minus sign and a trailing percent sign are stripped before
/// parsing (`zpool list` reports fragmentation as `"20%"`); an empty numeric
/// field coerces to 0. The unavailable sentinel `"-"` is checked first so it
/// stays text instead of stripping down to an empty field and becoming 0.
///
/// Coercion never fails: unparsable text is returned unchanged.
pub fn coerce(raw: &str) -> CoercedValue {
    if raw == UNAVAILABLE {
        return CoercedValue::Text(raw.to_string());
    }

    let stripped = raw.strip_prefix('-').unwrap_or(raw);
    let stripped = stripped.strip_suffix('%').unwrap_or(stripped);

    if stripped.is_empty() {
        return CoercedValue::Num(0.0);
    }

    match stripped.parse::<f64>() {
        Ok(v) => CoercedValue::Num(v),
        Err(_) => CoercedValue::Text(raw.to_string()),
    }
}
