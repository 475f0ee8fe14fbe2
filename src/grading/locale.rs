//! Decimal-comma formatting and parsing.
//!
//! Grades are shown the Dutch way (`5,5`), while points and search terms may
//! be typed with either separator. All conversions between numbers and text
//! go through this module.

/// Format `value` with exactly `decimals` fractional digits and a comma as
/// decimal separator: `5.5 -> "5,5"`, `10 -> "10,0"`.
pub fn format_decimal_comma(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value).replace('.', ",")
}

/// Textual form of a points value: shortest decimal with a period and no
/// trailing `.0` (`0`, `0.5`, `20`).
///
/// Values are rounded to nine decimals first so `3 * 0.1` prints as `0.3`.
pub fn format_points(points: f64) -> String {
    let rounded = round_points(points);
    // -0.0 would print as "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Same as [`format_points`] but with a decimal comma, for display.
pub fn format_points_comma(points: f64) -> String {
    format_points(points).replace('.', ",")
}

/// Above this, a points value has no fraction left to round
const LARGE_POINTS: f64 = 1e7;

/// Round to nine decimals, dropping floating point noise from step arithmetic.
///
/// Magnitudes of `1e7` and up carry no nine-decimal fraction in an `f64` and
/// are returned as is; scaling them by `1e9` could overflow.
pub fn round_points(points: f64) -> f64 {
    if !points.is_finite() || points.abs() >= LARGE_POINTS {
        return points;
    }
    (points * 1e9).round() / 1e9
}

/// Parse a finite number written with either `,` or `.` as decimal separator.
///
/// Returns `None` for empty input, garbage, or non-finite values such as
/// `inf` and `NaN`.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Normalize user text for substring search: lower-case, trimmed, every
/// comma replaced by a period.
pub fn normalize_search_term(term: &str) -> String {
    term.trim().to_lowercase().replace(',', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal_comma() {
        assert_eq!(format_decimal_comma(5.5, 1), "5,5");
        assert_eq!(format_decimal_comma(1.0, 1), "1,0");
        assert_eq!(format_decimal_comma(10.0, 1), "10,0");
    }

    #[test]
    fn test_format_points_whole_and_half() {
        assert_eq!(format_points(0.0), "0");
        assert_eq!(format_points(0.5), "0.5");
        assert_eq!(format_points(20.0), "20");
        assert_eq!(format_points(-0.0), "0");
    }

    #[test]
    fn test_format_points_drops_float_noise() {
        assert_eq!(format_points(3.0 * 0.1), "0.3");
        assert_eq!(format_points(3.0 * 0.3), "0.9");
    }

    #[test]
    fn test_round_points_keeps_huge_values() {
        assert_eq!(round_points(1e300), 1e300);
        assert_eq!(round_points(-3e299), -3e299);
        assert_eq!(round_points(12_345_678.5), 12_345_678.5);
        assert_eq!(round_points(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_format_points_comma() {
        assert_eq!(format_points_comma(12.5), "12,5");
        assert_eq!(format_points_comma(12.0), "12");
    }

    #[test]
    fn test_parse_decimal_accepts_both_separators() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal(" 12.5 "), Some(12.5));
        assert_eq!(parse_decimal("20"), Some(20.0));
        assert_eq!(parse_decimal("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage_and_non_finite() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn test_normalize_search_term() {
        assert_eq!(normalize_search_term("  5,5 "), "5.5");
        assert_eq!(normalize_search_term("ABC"), "abc");
        assert_eq!(normalize_search_term("1,2,3"), "1.2.3");
    }
}
