use serde::Serialize;
use std::fmt;

use super::formula::{grade_for, FormulaConfig, Grade};
use super::locale::{format_points, round_points};

/// Upper bound on generated rows. Larger tables are rejected, not truncated.
pub const MAX_ROWS: usize = 100_000;

// Tolerance when counting steps, so 0.3 / 0.1 still yields 3 steps.
const STEP_EPSILON: f64 = 1e-9;

/// One line of the conversion table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRow {
    pub score: f64,
    pub grade: Grade,
}

impl ConversionRow {
    /// Score as search text (`0.5`, `20`).
    pub fn score_text(&self) -> String {
        format_points(self.score)
    }

    /// Grade as display text (`5,5`).
    pub fn grade_text(&self) -> String {
        self.grade.to_string()
    }
}

/// Rows ordered by ascending score, rebuilt wholesale on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConversionTable {
    rows: Vec<ConversionRow>,
}

impl ConversionTable {
    pub fn from_rows(rows: Vec<ConversionRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ConversionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversionRow> {
        self.rows.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ConversionRow> {
        self.rows.get(index)
    }
}

impl<'a> IntoIterator for &'a ConversionTable {
    type Item = &'a ConversionRow;
    type IntoIter = std::slice::Iter<'a, ConversionRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// Step is zero, negative or not finite.
    InvalidStep(f64),
    /// Max score is infinite, so the row count would be unbounded.
    UnboundedScale(f64),
    TooManyRows { rows: f64, limit: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::InvalidStep(step) => {
                write!(f, "Step must be a positive number, got {}", step)
            }
            TableError::UnboundedScale(max) => {
                write!(f, "Max score must be finite, got {}", max)
            }
            TableError::TooManyRows { rows, limit } => write!(
                f,
                "Table would have {} rows (limit {}). Use a larger step or a smaller max score",
                rows, limit
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Generate rows for scores `0, step, 2*step, ...` up to and including
/// `max_score`.
///
/// A non-positive (or NaN) `max_score` yields an empty table. Scores are
/// computed as `i * step` rather than accumulated, so long tables with
/// fractional steps don't drift.
pub fn build_table(config: &FormulaConfig, step: f64) -> Result<ConversionTable, TableError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(TableError::InvalidStep(step));
    }
    if !config.has_valid_scale() {
        return Ok(ConversionTable::default());
    }
    if config.max_score.is_infinite() {
        return Err(TableError::UnboundedScale(config.max_score));
    }

    let steps = (config.max_score / step + STEP_EPSILON).floor();
    let count = steps + 1.0;
    if count > MAX_ROWS as f64 {
        return Err(TableError::TooManyRows {
            rows: count,
            limit: MAX_ROWS,
        });
    }

    let rows = (0..count as usize)
        .map(|i| {
            let score = round_points(i as f64 * step).min(config.max_score);
            ConversionRow {
                score,
                grade: grade_for(score, config),
            }
        })
        .collect();

    Ok(ConversionTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twenty() -> FormulaConfig {
        FormulaConfig {
            max_score: 20.0,
            multiplier: 9.0,
            base: 1.0,
        }
    }

    #[test]
    fn test_half_point_row_count() {
        let table = build_table(&twenty(), 0.5).unwrap();
        assert_eq!(table.len(), 41);
        assert_eq!(table.rows()[0].score, 0.0);
        assert_eq!(table.rows()[1].score, 0.5);
        assert_eq!(table.rows()[40].score, 20.0);
    }

    #[test]
    fn test_whole_point_row_count() {
        let table = build_table(&twenty(), 1.0).unwrap();
        assert_eq!(table.len(), 21);
    }

    #[test]
    fn test_first_and_last_grades() {
        let table = build_table(&twenty(), 0.5).unwrap();
        assert_eq!(table.rows()[0].grade_text(), "1,0");
        assert_eq!(table.rows()[40].grade_text(), "10,0");
    }

    #[test]
    fn test_eleven_points_row() {
        let table = build_table(&twenty(), 0.5).unwrap();
        let row = table.iter().find(|r| r.score == 11.0).unwrap();
        assert_eq!(row.grade_text(), "6,0");
    }

    #[test]
    fn test_scores_ascending_from_zero() {
        let table = build_table(&twenty(), 0.5).unwrap();
        assert_eq!(table.rows()[0].score, 0.0);
        for pair in table.rows().windows(2) {
            assert!(pair[0].score < pair[1].score);
        }
    }

    #[test]
    fn test_zero_max_is_empty() {
        let config = FormulaConfig {
            max_score: 0.0,
            ..twenty()
        };
        assert!(build_table(&config, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_negative_and_nan_max_are_empty() {
        for max in [-5.0, f64::NAN, f64::NEG_INFINITY] {
            let config = FormulaConfig {
                max_score: max,
                ..twenty()
            };
            assert!(build_table(&config, 1.0).unwrap().is_empty());
        }
    }

    #[test]
    fn test_infinite_max_rejected() {
        let config = FormulaConfig {
            max_score: f64::INFINITY,
            ..twenty()
        };
        assert!(matches!(
            build_table(&config, 1.0),
            Err(TableError::UnboundedScale(_))
        ));
    }

    #[test]
    fn test_invalid_step_rejected() {
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = build_table(&twenty(), step);
            assert!(matches!(result, Err(TableError::InvalidStep(_))), "step {}", step);
        }
    }

    #[test]
    fn test_too_many_rows_rejected() {
        let config = FormulaConfig {
            max_score: 1e9,
            ..twenty()
        };
        let err = build_table(&config, 1.0).unwrap_err();
        assert!(matches!(err, TableError::TooManyRows { .. }));
        assert!(err.to_string().contains("limit 100000"));
    }

    #[test]
    fn test_step_not_dividing_max() {
        let config = FormulaConfig {
            max_score: 7.0,
            ..twenty()
        };
        let table = build_table(&config, 2.0).unwrap();
        let scores: Vec<f64> = table.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_fractional_step_has_no_drift() {
        let config = FormulaConfig {
            max_score: 1.0,
            ..twenty()
        };
        let table = build_table(&config, 0.1).unwrap();
        assert_eq!(table.len(), 11);
        assert_eq!(table.rows()[3].score_text(), "0.3");
        assert_eq!(table.rows()[10].score, 1.0);
    }

    #[test]
    fn test_arbitrary_step() {
        let config = FormulaConfig {
            max_score: 10.0,
            ..twenty()
        };
        let table = build_table(&config, 2.5).unwrap();
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_huge_step_keeps_scores_ascending() {
        let config = FormulaConfig {
            max_score: 5e300,
            ..twenty()
        };
        let table = build_table(&config, 1e300).unwrap();
        assert_eq!(table.len(), 6);
        let scores: Vec<f64> = table.iter().map(|row| row.score).collect();
        assert!(scores.windows(2).all(|w| w[0] < w[1]), "{:?}", scores);
        assert_eq!(scores[1], 1e300);
        assert_eq!(table.rows()[5].grade, Grade::MAX);
    }

    #[test]
    fn test_all_grades_within_scale() {
        let config = FormulaConfig {
            max_score: 33.0,
            multiplier: 25.0,
            base: -4.0,
        };
        let table = build_table(&config, 0.5).unwrap();
        for row in &table {
            assert!(row.grade >= Grade::MIN && row.grade <= Grade::MAX);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let first = build_table(&twenty(), 0.5).unwrap();
        let second = build_table(&twenty(), 0.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_serializes_as_array() {
        let config = FormulaConfig {
            max_score: 1.0,
            ..twenty()
        };
        let table = build_table(&config, 1.0).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"[{"score":0.0,"grade":"1,0"},{"score":1.0,"grade":"10,0"}]"#
        );
    }
}
