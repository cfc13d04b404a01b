//! Numeric coercion for arbitrary cell content.
//!
//! This is the single point where malformed spreadsheet data is
//! neutralized. The returned `0.0` means "no usable number here", NOT
//! "measured zero" — callers auditing totals must keep the two apart.
//! Nothing in this module can fail or panic.

use crate::cell::CellValue;

/// Coerce a cell to a number.
///
/// - Numbers pass through (non-finite values become 0.0).
/// - Text is trimmed, stripped of thousands separators and percent
///   signs, then parsed; anything unparseable becomes 0.0.
/// - Booleans count as 1/0.
/// - Empty cells become 0.0.
pub fn to_number(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Empty => 0.0,
        CellValue::Number(n) => {
            if n.is_finite() {
                *n
            } else {
                0.0
            }
        }
        CellValue::Text(s) => parse_loose(s),
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Parse a string the way users type numbers into spreadsheets:
/// `" 1,200 "` → 1200, `"85%"` → 85, `"abc"` → 0.
pub fn parse_loose(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Truncate a label for display, appending ".." when shortened.
///
/// Cosmetic only — never part of the aggregation contract. Operates on
/// characters, not bytes, so multi-byte labels are never split.
pub fn truncate_for_display(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        return label.to_string();
    }
    if max_len <= 2 {
        return label.chars().take(max_len).collect();
    }
    let head: String = label.chars().take(max_len - 2).collect();
    format!("{}..", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(to_number(&CellValue::Number(12.5)), 12.5);
        assert_eq!(to_number(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&CellValue::Number(f64::INFINITY)), 0.0);
    }

    #[test]
    fn text_with_separators_and_percent() {
        assert_eq!(to_number(&CellValue::Text("1,200".into())), 1200.0);
        assert_eq!(to_number(&CellValue::Text(" 1,234,567.5 ".into())), 1_234_567.5);
        assert_eq!(to_number(&CellValue::Text("85%".into())), 85.0);
        assert_eq!(to_number(&CellValue::Text("-3.25".into())), -3.25);
    }

    #[test]
    fn garbage_becomes_zero() {
        assert_eq!(to_number(&CellValue::Text("abc".into())), 0.0);
        assert_eq!(to_number(&CellValue::Text("".into())), 0.0);
        assert_eq!(to_number(&CellValue::Text("N/A".into())), 0.0);
        assert_eq!(to_number(&CellValue::Text("$".into())), 0.0);
        assert_eq!(to_number(&CellValue::Empty), 0.0);
    }

    #[test]
    fn bools_count_as_one_and_zero() {
        assert_eq!(to_number(&CellValue::Bool(true)), 1.0);
        assert_eq!(to_number(&CellValue::Bool(false)), 0.0);
    }

    #[test]
    fn truncation_is_char_aware() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("a very long label", 8), "a very..");
        assert_eq!(truncate_for_display("héllo wörld", 7), "héllo..");
        assert_eq!(truncate_for_display("ab", 2), "ab");
        assert_eq!(truncate_for_display("abc", 2), "ab");
    }
}
