use super::{normalize_key, CredentialError};

/// Prompts the user for an API key without echoing it.
pub fn prompt_for_api_key() -> Result<String, CredentialError> {
    eprintln!("An API key for the Generative Language API is required for roster parsing.");
    eprintln!("Create one at: https://aistudio.google.com/apikey");
    eprintln!("The key is used for this run only and is not stored.");
    eprintln!();

    let key = rpassword::prompt_password("Enter API key: ")
        .map_err(|e| CredentialError::PromptFailed(e.to_string()))?;

    normalize_key(Some(key)).ok_or(CredentialError::Missing)
}
