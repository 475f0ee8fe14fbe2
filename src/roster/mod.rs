//! Turning free text into graded students via a hosted language model.
//!
//! The model is an external collaborator behind [`RosterParser`]. Nothing in
//! the grading core depends on it, and [`import_roster`] absorbs every
//! failure into an empty result.

pub mod client;
pub mod import;
pub mod request;
pub mod types;

pub use client::GeminiClient;
pub use import::{grade_entries, import_roster, RosterImport};
pub use types::{RosterEntry, StudentResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_RETRIES: usize = 3;

/// Extracts roster entries from free text.
pub trait RosterParser {
    /// Parse `text` as-is. Implementations must not rewrite the input.
    fn parse_roster(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<RosterEntry>, RosterError>> + Send;
}

/// Roster section of the config file.
///
/// Example YAML:
/// ```yaml
/// roster:
///   model: gemini-3-flash-preview
///   timeout: 20s
///   retries: 3
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL of the API, without the `/models/...` part
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in humantime format ("20s", "1m")
    #[serde(default)]
    pub timeout: Option<String>,

    /// Total attempts for transient failures
    #[serde(default)]
    pub retries: Option<usize>,
}

impl RosterConfig {
    /// Fill unset fields with defaults.
    pub fn resolve(&self) -> anyhow::Result<RosterSettings> {
        let timeout = match &self.timeout {
            Some(t) => humantime::parse_duration(t.trim())
                .map_err(|e| anyhow::anyhow!("roster.timeout: invalid '{}' - {}", t, e))?,
            None => DEFAULT_TIMEOUT,
        };
        Ok(RosterSettings {
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout,
            retries: self.retries.unwrap_or(DEFAULT_RETRIES),
        })
    }
}

/// Validate roster configuration at startup, collecting every error.
pub fn validate_roster(config: &RosterConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref model) = config.model {
        if model.trim().is_empty() {
            errors.push("roster.model: must not be empty".to_string());
        }
    }
    if let Some(ref endpoint) = config.endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(format!("roster.endpoint: must be an http(s) URL, got '{}'", endpoint));
        }
    }
    if let Some(ref timeout) = config.timeout {
        if let Err(e) = humantime::parse_duration(timeout.trim()) {
            errors.push(format!("roster.timeout: invalid '{}' - {}", timeout, e));
        }
    }
    if config.retries == Some(0) {
        errors.push("roster.retries: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterSettings {
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub retries: usize,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

#[derive(Debug)]
pub enum RosterError {
    MissingApiKey,
    Transport(reqwest::Error),
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    EmptyResponse,
    Malformed(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::MissingApiKey => write!(
                f,
                "API key is missing. Set CIJFER_API_KEY or pass --ask-key"
            ),
            RosterError::Transport(e) => write!(f, "Request failed: {}", e),
            RosterError::Status { status, body } => {
                let snippet: String = body.chars().take(200).collect();
                if snippet.is_empty() {
                    write!(f, "API returned HTTP {}", status)
                } else {
                    write!(f, "API returned HTTP {}: {}", status, snippet)
                }
            }
            RosterError::EmptyResponse => write!(f, "API returned no candidates"),
            RosterError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for RosterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
