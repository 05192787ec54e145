//! Provider module for Essay Tutor
//!
//! This module contains the completion provider abstraction and the
//! OpenAI and Ollama implementations.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, Provider, TokenUsage,
};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{Result, TutorError};
use reqwest::Client;
use std::time::Duration;

/// Completion timeout assumed when a provider is built without one
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack between the turn timeout and the HTTP client timeout; the turn
/// timeout must fire first so callers see `TutorError::Timeout`
const HTTP_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// HTTP client timeout for a given completion timeout
pub fn http_timeout(request_timeout: Duration) -> Duration {
    request_timeout + HTTP_TIMEOUT_GRACE
}

pub(crate) fn build_http_client(request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(http_timeout(request_timeout))
        .user_agent(concat!("essay-tutor/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TutorError::Provider(format!("Failed to create HTTP client: {}", e)).into())
}

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("openai" or "ollama")
/// * `config` - Provider configuration
/// * `request_timeout` - Completion timeout the HTTP client must outlast
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
/// (including a missing OpenAI API key)
///
/// # Examples
///
/// ```
/// use essay_tutor::config::ProviderConfig;
/// use essay_tutor::providers::{create_provider, DEFAULT_REQUEST_TIMEOUT};
///
/// let config = ProviderConfig::default();
/// assert!(create_provider("ollama", &config, DEFAULT_REQUEST_TIMEOUT).is_ok());
/// assert!(create_provider("openai", &config, DEFAULT_REQUEST_TIMEOUT).is_err()); // no API key
/// ```
pub fn create_provider(
    provider_type: &str,
    config: &ProviderConfig,
    request_timeout: Duration,
) -> Result<Box<dyn Provider>> {
    match provider_type {
        "openai" => Ok(Box::new(OpenAiProvider::with_timeout(
            config.openai.clone(),
            request_timeout,
        )?)),
        "ollama" => Ok(Box::new(OllamaProvider::with_timeout(
            config.ollama.clone(),
            request_timeout,
        )?)),
        _ => Err(TutorError::Provider(format!(
            "Unknown provider type: {}",
            provider_type
        ))
        .into()),
    }
}
