use reqwest::StatusCode;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::request::{decode_roster_text, GenerateContentRequest, GenerateContentResponse};
use super::types::RosterEntry;
use super::{RosterError, RosterParser, RosterSettings};

/// Roster parser backed by the Generative Language REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    settings: RosterSettings,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client. A missing key is not an error here; every parse
    /// attempt then fails with [`RosterError::MissingApiKey`].
    pub fn new(settings: RosterSettings, api_key: Option<String>) -> Result<Self, RosterError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("cijfer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RosterError::Transport)?;

        Ok(Self {
            http,
            settings,
            api_key,
        })
    }

    pub fn settings(&self) -> &RosterSettings {
        &self.settings
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    async fn generate(&self, api_key: &str, text: &str) -> Result<String, RosterError> {
        let body = GenerateContentRequest::for_roster(text);
        let url = self.url();

        tracing::debug!(model = %self.settings.model, chars = text.len(), "Requesting roster extraction");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(RosterError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RosterError::Status { status, body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RosterError::Malformed(format!("unexpected response body: {}", e)))?;

        parsed.text().ok_or(RosterError::EmptyResponse)
    }
}

impl RosterParser for GeminiClient {
    async fn parse_roster(&self, text: &str) -> Result<Vec<RosterEntry>, RosterError> {
        let api_key = self.api_key.as_deref().ok_or(RosterError::MissingApiKey)?;

        // Retry strategy: exponential backoff, transient failures only
        let retry_strategy = ExponentialBackoff::from_millis(200)
            .max_delay(std::time::Duration::from_secs(5))
            .take(self.settings.retries.saturating_sub(1));

        let answer = RetryIf::spawn(
            retry_strategy,
            || self.generate(api_key, text),
            |e: &RosterError| {
                let transient = e.is_transient();
                if transient {
                    tracing::debug!(error = %e, "Transient roster request failure, retrying");
                }
                transient
            },
        )
        .await?;

        let decoded = decode_roster_text(&answer)?;
        tracing::debug!(
            entries = decoded.entries.len(),
            skipped = decoded.skipped,
            "Roster extraction finished"
        );
        Ok(decoded.entries)
    }
}

impl RosterError {
    /// Connection problems, timeouts, rate limiting and server errors are
    /// worth another attempt; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            RosterError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RosterError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
