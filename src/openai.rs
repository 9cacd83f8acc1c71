//! OpenAI-compatible client configuration.
//!
//! Ollama serves the chat completions API under `/v1`, so the same client
//! talks to a local Ollama server or a hosted endpoint.

use crate::config::LlmSettings;
use crate::error::{PlanetaryError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Placeholder key; Ollama ignores it but the client always sends one.
const LOCAL_API_KEY: &str = "ollama";

/// Create a client for the configured model server.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(settings.timeout_secs))
}

/// Create a client with a custom HTTP timeout.
pub fn create_client_with_timeout(
    settings: &LlmSettings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    url::Url::parse(&settings.api_base())
        .map_err(|e| PlanetaryError::Config(format!("Invalid llm.host '{}': {}", settings.host, e)))?;

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base())
        .with_api_key(settings.api_key.as_deref().unwrap_or(LOCAL_API_KEY));

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_host() {
        let settings = LlmSettings {
            host: "not a url".to_string(),
            ..LlmSettings::default()
        };
        assert!(matches!(create_client(&settings), Err(PlanetaryError::Config(_))));
    }

    #[test]
    fn test_accepts_default_host() {
        assert!(create_client(&LlmSettings::default()).is_ok());
    }
}
