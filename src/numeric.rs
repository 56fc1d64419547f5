//! Locale-aware coercion of text cells into numbers.

/// Parses a cell written with `.` as the thousands separator and `,` as the
/// decimal separator.
///
/// Anything that does not parse to a finite number, including empty and
/// absent cells, becomes `0.0`. Callers never see a missing number.
pub fn coerce_number(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };

    let rewritten = value.trim().replace('.', "").replace(',', ".");
    match rewritten.parse::<f64>() {
        Ok(number) if number.is_finite() => number,
        _ => 0.0,
    }
}
