use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grading::locale::parse_decimal;
use crate::grading::Grade;

/// A name and the points extracted for it from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub score: f64,
}

impl RosterEntry {
    /// Build an entry from one element of the model's JSON array.
    ///
    /// The score may be a JSON number or a numeric string with either
    /// decimal separator. Returns `None` when the name is blank or the score
    /// is missing, non-numeric or not finite.
    pub fn from_value(value: &Value) -> Option<RosterEntry> {
        let name = value.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }
        let score = match value.get("score")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => parse_decimal(s)?,
            _ => return None,
        };
        if !score.is_finite() {
            return None;
        }
        Some(RosterEntry {
            name: name.to_string(),
            score,
        })
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.score.is_finite()
    }
}

/// A graded student, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentResult {
    /// 1-based position in the extracted roster
    pub id: usize,
    pub name: String,
    pub points: f64,
    pub grade: Grade,
}
