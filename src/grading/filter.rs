use std::borrow::Cow;

use super::locale::normalize_search_term;
use super::table::{ConversionRow, ConversionTable};

/// Keep the rows whose score or grade text contains `term`.
///
/// A blank term hands back the input table itself. Otherwise the term is
/// lower-cased, trimmed and comma-normalized, so `5,5` and `5.5` both find
/// grade 5,5. Matching is by substring: `1` matches 1, 10, 11 and 6,1.
pub fn filter_table<'a>(table: &'a ConversionTable, term: &str) -> Cow<'a, ConversionTable> {
    if term.trim().is_empty() {
        return Cow::Borrowed(table);
    }

    let needle = normalize_search_term(term);
    let rows = table
        .iter()
        .filter(|row| row_matches(row, &needle))
        .cloned()
        .collect();

    Cow::Owned(ConversionTable::from_rows(rows))
}

/// `needle` must already be normalized.
pub fn row_matches(row: &ConversionRow, needle: &str) -> bool {
    row.score_text().contains(needle) || row.grade.to_period_string().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{build_table, FormulaConfig};

    fn twenty_table() -> ConversionTable {
        build_table(&FormulaConfig::default(), 0.5).unwrap()
    }

    #[test]
    fn test_empty_term_returns_same_table() {
        let table = twenty_table();
        let filtered = filter_table(&table, "");
        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert!(std::ptr::eq(filtered.as_ref(), &table));
        assert_eq!(*filtered, table);
    }

    #[test]
    fn test_whitespace_term_returns_same_table() {
        let table = twenty_table();
        let filtered = filter_table(&table, "   ");
        assert!(matches!(filtered, Cow::Borrowed(_)));
    }

    #[test]
    fn test_comma_term_matches_grade_text() {
        let table = twenty_table();
        let filtered = filter_table(&table, "5,5");
        let expected: Vec<&ConversionRow> = table
            .iter()
            .filter(|r| r.grade_text().replace(',', ".").contains("5.5"))
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(filtered.len(), expected.len());
        for (got, want) in filtered.iter().zip(expected) {
            assert_eq!(got, want);
        }
    }

    #[test]
    fn test_period_and_comma_terms_agree() {
        let table = twenty_table();
        assert_eq!(filter_table(&table, "5,5"), filter_table(&table, "5.5"));
    }

    #[test]
    fn test_substring_not_prefix() {
        let table = twenty_table();
        let filtered = filter_table(&table, "1");
        let scores: Vec<String> = filtered.iter().map(|r| r.score_text()).collect();
        assert!(scores.contains(&"1".to_string()));
        assert!(scores.contains(&"10".to_string()));
        assert!(scores.contains(&"11".to_string()));
        // 4 points is grade 2,8: neither text contains "1"
        assert!(!scores.contains(&"4".to_string()));
    }

    #[test]
    fn test_matches_half_point_scores() {
        let table = twenty_table();
        let filtered = filter_table(&table, "12.5");
        assert!(filtered.iter().any(|r| r.score == 12.5));
    }

    #[test]
    fn test_is_subsequence_in_order() {
        let table = twenty_table();
        let filtered = filter_table(&table, "7");
        let mut source = table.iter();
        for row in filtered.iter() {
            assert!(source.any(|r| r == row), "row out of order or invented");
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        let table = twenty_table();
        assert!(filter_table(&table, "abc").is_empty());
    }

    #[test]
    fn test_term_is_trimmed() {
        let table = twenty_table();
        assert_eq!(filter_table(&table, " 10,0 "), filter_table(&table, "10.0"));
    }
}
