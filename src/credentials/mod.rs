pub mod prompt;

use std::fmt;

/// Environment variable holding the API key for roster parsing
pub const ENV_KEY_VAR: &str = "CIJFER_API_KEY";

/// Fallback variable, as set by Google's own tooling
pub const ENV_FALLBACK_KEY_VAR: &str = "GEMINI_API_KEY";

pub use prompt::prompt_for_api_key;

#[derive(Debug)]
pub enum CredentialError {
    Missing,
    PromptFailed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Missing => write!(
                f,
                "No API key found. Set {} (or {})",
                ENV_KEY_VAR, ENV_FALLBACK_KEY_VAR
            ),
            CredentialError::PromptFailed(msg) => write!(f, "Failed to read API key: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Trim a candidate key; blank values count as missing.
pub fn normalize_key(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Look up the API key in the environment, primary variable first.
pub fn get_api_key_from_env() -> Option<String> {
    normalize_key(std::env::var(ENV_KEY_VAR).ok())
        .or_else(|| normalize_key(std::env::var(ENV_FALLBACK_KEY_VAR).ok()))
}

/// Resolve the key for this run. With `ask` set, prompt (hidden input) when
/// the environment has none. The key is never written anywhere.
pub fn resolve_api_key(ask: bool) -> Result<String, CredentialError> {
    if let Some(key) = get_api_key_from_env() {
        return Ok(key);
    }
    if ask {
        return prompt_for_api_key();
    }
    Err(CredentialError::Missing)
}
