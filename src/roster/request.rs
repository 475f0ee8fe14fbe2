//! Wire types for the Generative Language `generateContent` call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::types::RosterEntry;
use super::RosterError;

const PROMPT_HEADER: &str = "Extract every student and the points they scored from the text below. \
The text may be in Dutch or English and may use formats like \"Jan 12\", \"Piet: 15\", \
\"18 punten voor Klaas\" or \"Anna, 12,5\". \
Answer with a JSON array of objects with the fields 'name' (string) and 'score' (number) only.\n\
Text:\n";

/// Build the prompt. The user's text is appended verbatim.
pub fn build_prompt(text: &str) -> String {
    format!("{}{}", PROMPT_HEADER, text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl GenerateContentRequest {
    pub fn for_roster(text: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(text)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: roster_schema(),
            },
        }
    }
}

fn roster_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "score": { "type": "NUMBER" }
            },
            "required": ["name", "score"]
        }
    })
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

/// Decoded roster plus the number of array elements that were dropped.
#[derive(Debug, Default, PartialEq)]
pub struct DecodedRoster {
    pub entries: Vec<RosterEntry>,
    pub skipped: usize,
}

/// Turn the model's answer into roster entries.
///
/// An empty answer is an empty roster. Anything other than a JSON array is
/// [`RosterError::Malformed`]. Elements without a name or a numeric score
/// are counted in `skipped`.
pub fn decode_roster_text(text: &str) -> Result<DecodedRoster, RosterError> {
    let trimmed = strip_code_fence(text.trim());
    if trimmed.is_empty() {
        return Ok(DecodedRoster::default());
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| RosterError::Malformed(format!("response is not JSON: {}", e)))?;
    let items = value
        .as_array()
        .ok_or_else(|| RosterError::Malformed("expected a JSON array".to_string()))?;

    let mut decoded = DecodedRoster::default();
    for item in items {
        match RosterEntry::from_value(item) {
            Some(entry) => decoded.entries.push(entry),
            None => {
                tracing::warn!(item = %item, "Skipping roster entry without name or numeric score");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

// Some models wrap JSON in ```json fences despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_keeps_text_verbatim() {
        let text = "Jan 12\n  Piet: 15,5 \"quoted\"";
        let prompt = build_prompt(text);
        assert!(prompt.ends_with(text));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::for_roster("Jan 12");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "ARRAY");
        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("Jan 12"));
    }

    #[test]
    fn test_response_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"name\":"},{"text":"\"Jan\",\"score\":12}]"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().unwrap(), r#"[{"name":"Jan","score":12}]"#);
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_decode_valid_roster() {
        let decoded = decode_roster_text(r#"[{"name":"Jan","score":12},{"name":"Piet","score":15.5}]"#).unwrap();
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[1].score, 15.5);
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_decode_skips_invalid_entries() {
        let decoded = decode_roster_text(r#"[{"name":"Jan","score":"veel"},{"name":"Piet","score":9}]"#).unwrap();
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].name, "Piet");
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_decode_empty_text() {
        assert_eq!(decode_roster_text("  ").unwrap(), DecodedRoster::default());
    }

    #[test]
    fn test_decode_code_fence() {
        let decoded = decode_roster_text("```json\n[{\"name\":\"Jan\",\"score\":1}]\n```").unwrap();
        assert_eq!(decoded.entries.len(), 1);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(matches!(
            decode_roster_text(r#"{"name":"Jan"}"#),
            Err(RosterError::Malformed(_))
        ));
        assert!(matches!(decode_roster_text("not json"), Err(RosterError::Malformed(_))));
    }
}
