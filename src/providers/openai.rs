//! OpenAI provider implementation for Essay Tutor
//!
//! This module implements the Provider trait against the OpenAI chat
//! completions API (or any server exposing the same `/chat/completions`
//! contract). An API key is required at construction time.

use crate::config::OpenAiConfig;
use crate::error::{Result, TutorError};
use crate::providers::{
    build_http_client, http_timeout, ChatMessage, CompletionRequest, CompletionResponse, Provider,
    TokenUsage, DEFAULT_REQUEST_TIMEOUT,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI chat completions provider
///
/// # Examples
///
/// ```no_run
/// use essay_tutor::config::OpenAiConfig;
/// use essay_tutor::providers::{ChatMessage, CompletionRequest, OpenAiProvider, Provider};
///
/// # async fn example() -> essay_tutor::error::Result<()> {
/// let config = OpenAiConfig {
///     api_key: Some("sk-...".to_string()),
///     ..Default::default()
/// };
/// let provider = OpenAiProvider::new(config)?;
/// let request = CompletionRequest::new(vec![ChatMessage::user("Hello!")], 500, 0.7);
/// let completion = provider.complete(&request).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    request_timeout: Duration,
}

/// Request structure for the chat completions endpoint
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

/// Response structure from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// Error envelope returned by the API on failure
#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn format_openai_api_error(status: reqwest::StatusCode, body: &str) -> TutorError {
    let detail = serde_json::from_str::<OpenAiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == reqwest::StatusCode::UNAUTHORIZED {
        TutorError::Authentication(format!(
            "OpenAI returned error {}: {}. Check the OPENAI_API_KEY value",
            status, detail
        ))
    } else {
        TutorError::Provider(format!("OpenAI returned error {}: {}", status, detail))
    }
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Errors
    ///
    /// Returns `TutorError::MissingCredentials` if no API key is configured,
    /// or a provider error if the HTTP client cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::config::OpenAiConfig;
    /// use essay_tutor::providers::OpenAiProvider;
    ///
    /// assert!(OpenAiProvider::new(OpenAiConfig::default()).is_err());
    ///
    /// let config = OpenAiConfig {
    ///     api_key: Some("sk-test".to_string()),
    ///     ..Default::default()
    /// };
    /// assert!(OpenAiProvider::new(config).is_ok());
    /// ```
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider whose HTTP client outlasts `request_timeout`
    ///
    /// # Errors
    ///
    /// Same as [`OpenAiProvider::new`]
    pub fn with_timeout(config: OpenAiConfig, request_timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| TutorError::MissingCredentials("openai".to_string()))?;

        let client = build_http_client(request_timeout)?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| OPENAI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
            api_base,
            config.model
        );

        Ok(Self {
            client,
            api_key,
            model: config.model,
            api_base,
            request_timeout,
        })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Timeout applied by the underlying HTTP client
    pub fn http_timeout(&self) -> Duration {
        http_timeout(self.request_timeout)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let openai_request = OpenAiRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        tracing::debug!(
            "Sending OpenAI request: {} messages, max_tokens={}, temperature={}",
            request.messages.len(),
            request.max_tokens,
            request.temperature
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                TutorError::Provider(format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(format_openai_api_error(status, &error_text).into());
        }

        let openai_response: OpenAiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            TutorError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TutorError::Provider("No choices in OpenAI response".to_string()))?;

        tracing::debug!(
            "OpenAI response received: finish_reason={}",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        );

        let content = choice.message.content.ok_or_else(|| {
            TutorError::Provider("OpenAI response contained no message content".to_string())
        })?;

        let response = match openai_response.usage {
            Some(u) => CompletionResponse::with_usage(
                content,
                TokenUsage::new(u.prompt_tokens, u.completion_tokens),
            ),
            None => CompletionResponse::new(content),
        };
        Ok(response)
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.model.clone())
    }
}
