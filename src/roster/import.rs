use super::types::{RosterEntry, StudentResult};
use super::RosterParser;
use crate::grading::{grade_for, GradingSettings};

/// Outcome of a roster import. Never an error: a failed parse is an empty
/// student list with `failure` set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterImport {
    pub students: Vec<StudentResult>,
    /// Entries dropped because their score was not a finite number or the
    /// name was blank.
    pub skipped: usize,
    pub failure: Option<String>,
}

impl RosterImport {
    pub fn failed(message: String) -> Self {
        Self {
            students: Vec::new(),
            skipped: 0,
            failure: Some(message),
        }
    }

    pub fn passing_count(&self, threshold: f64) -> usize {
        self.students
            .iter()
            .filter(|s| s.grade.is_passing(threshold))
            .count()
    }
}

/// Grade valid entries in roster order; invalid ones are counted, not kept.
pub fn grade_entries(entries: Vec<RosterEntry>, settings: &GradingSettings) -> RosterImport {
    let mut import = RosterImport::default();
    for entry in entries {
        if !entry.is_valid() {
            tracing::warn!(name = %entry.name, score = entry.score, "Skipping invalid roster entry");
            import.skipped += 1;
            continue;
        }
        let grade = grade_for(entry.score, &settings.formula);
        import.students.push(StudentResult {
            id: import.students.len() + 1,
            name: entry.name,
            points: entry.score,
            grade,
        });
    }
    import
}

/// Send `text` to `parser` unmodified and grade whatever comes back.
pub async fn import_roster<P: RosterParser>(
    parser: &P,
    text: &str,
    settings: &GradingSettings,
) -> RosterImport {
    if text.trim().is_empty() {
        return RosterImport::failed("No roster text given".to_string());
    }

    match parser.parse_roster(text).await {
        Ok(entries) => {
            let import = grade_entries(entries, settings);
            tracing::debug!(
                students = import.students.len(),
                skipped = import.skipped,
                "Roster imported"
            );
            import
        }
        Err(e) => {
            tracing::warn!(error = %e, "Roster parsing failed, no entries extracted");
            RosterImport::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterError;
    use std::sync::Mutex;

    struct FakeParser {
        result: fn() -> Result<Vec<RosterEntry>, RosterError>,
        seen: Mutex<Option<String>>,
    }

    impl FakeParser {
        fn new(result: fn() -> Result<Vec<RosterEntry>, RosterError>) -> Self {
            Self {
                result,
                seen: Mutex::new(None),
            }
        }
    }

    impl RosterParser for FakeParser {
        async fn parse_roster(&self, text: &str) -> Result<Vec<RosterEntry>, RosterError> {
            *self.seen.lock().unwrap() = Some(text.to_string());
            (self.result)()
        }
    }

    fn entry(name: &str, score: f64) -> RosterEntry {
        RosterEntry {
            name: name.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_import_grades_entries() {
        let parser = FakeParser::new(|| Ok(vec![entry("Jan", 11.0), entry("Piet", 20.0)]));
        let import = import_roster(&parser, "Jan 11, Piet 20", &GradingSettings::default()).await;

        assert!(import.failure.is_none());
        assert_eq!(import.students.len(), 2);
        assert_eq!(import.students[0].id, 1);
        assert_eq!(import.students[0].grade.to_string(), "6,0");
        assert_eq!(import.students[1].grade.to_string(), "10,0");
        assert_eq!(import.passing_count(5.5), 2);
    }

    #[tokio::test]
    async fn test_import_passes_text_unmodified() {
        let parser = FakeParser::new(|| Ok(vec![]));
        let text = "  Jan: 12\n\tPiet 15,5  ";
        import_roster(&parser, text, &GradingSettings::default()).await;
        assert_eq!(parser.seen.lock().unwrap().as_deref(), Some(text));
    }

    #[tokio::test]
    async fn test_failure_becomes_empty_import() {
        let parser = FakeParser::new(|| Err(RosterError::MissingApiKey));
        let import = import_roster(&parser, "Jan 12", &GradingSettings::default()).await;
        assert!(import.students.is_empty());
        assert!(import.failure.unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn test_blank_text_skips_parser() {
        let parser = FakeParser::new(|| Ok(vec![entry("Jan", 1.0)]));
        let import = import_roster(&parser, "   ", &GradingSettings::default()).await;
        assert!(import.students.is_empty());
        assert!(parser.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_grade_entries_skips_non_finite() {
        let entries = vec![entry("Jan", f64::NAN), entry("Piet", 10.0), entry(" ", 3.0)];
        let import = grade_entries(entries, &GradingSettings::default());
        assert_eq!(import.skipped, 2);
        assert_eq!(import.students.len(), 1);
        assert_eq!(import.students[0].id, 1);
        assert_eq!(import.students[0].name, "Piet");
    }
}
