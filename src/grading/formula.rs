use serde::{Serialize, Serializer};
use std::fmt;

use super::locale::format_decimal_comma;

/// Lowest grade on the scale.
pub const MIN_GRADE: f64 = 1.0;
/// Highest grade on the scale.
pub const MAX_GRADE: f64 = 10.0;
/// Conventional passing grade.
pub const DEFAULT_PASS_THRESHOLD: f64 = 5.5;

/// Parameters of the affine mapping `grade = (score / max_score) * multiplier + base`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormulaConfig {
    pub max_score: f64,
    pub multiplier: f64,
    pub base: f64,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            max_score: 20.0,
            multiplier: 9.0,
            base: 1.0,
        }
    }
}

impl FormulaConfig {
    /// True when the scale has a usable upper bound. NaN counts as unusable.
    pub fn has_valid_scale(&self) -> bool {
        self.max_score > 0.0
    }

    /// Unclamped, unrounded result of the formula. A degenerate scale
    /// reports `base`.
    pub fn raw(&self, score: f64) -> f64 {
        if !self.has_valid_scale() {
            return self.base;
        }
        (score / self.max_score) * self.multiplier + self.base
    }
}

/// A grade on the 1,0–10,0 scale, clamped and rounded to one decimal.
///
/// Stored in tenths so equality and the pass comparison are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade {
    tenths: u8,
}

impl Grade {
    pub const MIN: Grade = Grade { tenths: 10 };
    pub const MAX: Grade = Grade { tenths: 100 };

    /// Clamp `raw` into [1.0, 10.0] and round half away from zero at the
    /// first decimal. NaN maps to [`Grade::MIN`].
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Grade::MIN;
        }
        let clamped = raw.clamp(MIN_GRADE, MAX_GRADE);
        // clamped * 10 lies in [10, 100]
        Grade {
            tenths: (clamped * 10.0).round() as u8,
        }
    }

    pub fn tenths(&self) -> u8 {
        self.tenths
    }

    pub fn value(&self) -> f64 {
        f64::from(self.tenths) / 10.0
    }

    /// Passing means `grade >= threshold`, compared after rounding the
    /// threshold to tenths.
    pub fn is_passing(&self, threshold: f64) -> bool {
        if threshold.is_nan() {
            return false;
        }
        let threshold_tenths = (threshold * 10.0).round();
        f64::from(self.tenths) >= threshold_tenths
    }

    /// Grade text with a period instead of a comma (`5.5`), used for search.
    pub fn to_period_string(&self) -> String {
        format!("{:.1}", self.value())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_decimal_comma(self.value(), 1))
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Grade for `score` under `config`.
pub fn grade_for(score: f64, config: &FormulaConfig) -> Grade {
    Grade::from_raw(config.raw(score))
}

/// Convert a score into its formatted grade string (`"6,0"`).
///
/// Total over all `f64` inputs: a non-positive or NaN `max_score` yields the
/// clamped `base`, everything else saturates at the scale bounds.
pub fn compute_grade(score: f64, max_score: f64, multiplier: f64, base: f64) -> String {
    let config = FormulaConfig {
        max_score,
        multiplier,
        base,
    };
    grade_for(score, &config).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_back(grade: &str) -> f64 {
        grade.replace(',', ".").parse().unwrap()
    }

    #[test]
    fn test_concrete_scenario_eleven_of_twenty() {
        // (11 / 20) * 9 + 1 = 5.95 -> 6.0
        assert_eq!(compute_grade(11.0, 20.0, 9.0, 1.0), "6,0");
    }

    #[test]
    fn test_zero_score_is_base() {
        assert_eq!(compute_grade(0.0, 20.0, 9.0, 1.0), "1,0");
        assert_eq!(compute_grade(0.0, 20.0, 9.0, 3.25), "3,3");
    }

    #[test]
    fn test_full_score_is_multiplier_plus_base() {
        assert_eq!(compute_grade(20.0, 20.0, 9.0, 1.0), "10,0");
        assert_eq!(compute_grade(40.0, 40.0, 5.0, 2.0), "7,0");
    }

    #[test]
    fn test_rounds_half_up_at_first_decimal() {
        // raw is exactly base = 5.45
        assert_eq!(compute_grade(0.0, 1.0, 1.0, 5.45), "5,5");
        assert_eq!(compute_grade(0.0, 1.0, 1.0, 5.44), "5,4");
    }

    #[test]
    fn test_clamps_above_and_below() {
        assert_eq!(compute_grade(30.0, 20.0, 9.0, 1.0), "10,0");
        assert_eq!(compute_grade(-5.0, 20.0, 9.0, 1.0), "1,0");
        assert_eq!(compute_grade(10.0, 20.0, -9.0, 1.0), "1,0");
    }

    #[test]
    fn test_degenerate_max_returns_clamped_base() {
        assert_eq!(compute_grade(5.0, 0.0, 9.0, 1.0), "1,0");
        assert_eq!(compute_grade(5.0, -10.0, 9.0, 4.0), "4,0");
        assert_eq!(compute_grade(5.0, 0.0, 9.0, 42.0), "10,0");
        assert_eq!(compute_grade(5.0, f64::NAN, 9.0, 6.0), "6,0");
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(compute_grade(f64::NAN, 20.0, 9.0, 1.0), "1,0");
        assert_eq!(compute_grade(f64::INFINITY, 20.0, 9.0, 1.0), "10,0");
        assert_eq!(compute_grade(f64::NEG_INFINITY, 20.0, 9.0, 1.0), "1,0");
        assert_eq!(compute_grade(5.0, 20.0, 9.0, f64::NAN), "1,0");
        // inf / inf is NaN
        assert_eq!(compute_grade(f64::INFINITY, f64::INFINITY, 9.0, 1.0), "1,0");
    }

    #[test]
    fn test_result_always_within_scale() {
        let values = [
            -1e9, -100.0, -1.0, -0.5, 0.0, 0.3, 1.0, 5.45, 9.99, 20.0, 1e9,
            f64::NAN, f64::INFINITY, f64::NEG_INFINITY,
        ];
        for &score in &values {
            for &max in &[0.5, 1.0, 7.0, 20.0, 1e6] {
                for &m in &values {
                    for &b in &values {
                        let grade = parse_back(&compute_grade(score, max, m, b));
                        assert!(
                            (MIN_GRADE..=MAX_GRADE).contains(&grade),
                            "{} out of range for score={} max={} m={} b={}",
                            grade, score, max, m, b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_grade_display_and_value() {
        let grade = Grade::from_raw(5.95);
        assert_eq!(grade.tenths(), 60);
        assert_eq!(grade.value(), 6.0);
        assert_eq!(grade.to_string(), "6,0");
        assert_eq!(grade.to_period_string(), "6.0");
        assert_eq!(Grade::MAX.to_string(), "10,0");
    }

    #[test]
    fn test_pass_threshold() {
        assert!(Grade::from_raw(5.5).is_passing(5.5));
        assert!(!Grade::from_raw(5.4).is_passing(5.5));
        assert!(Grade::from_raw(5.45).is_passing(5.5));
        assert!(!Grade::MAX.is_passing(f64::NAN));
    }

    #[test]
    fn test_grade_serializes_as_text() {
        let json = serde_json::to_string(&Grade::from_raw(7.25)).unwrap();
        assert_eq!(json, "\"7,3\"");
    }

    #[test]
    fn test_is_pure() {
        let first = compute_grade(13.5, 20.0, 9.0, 1.0);
        let second = compute_grade(13.5, 20.0, 9.0, 1.0);
        assert_eq!(first, second);
    }
}
