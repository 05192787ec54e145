//! Test utilities for Essay Tutor
//!
//! Stub providers with deterministic behaviour, configuration fixtures and
//! assertion helpers shared by the unit tests.

use crate::config::Config;
use crate::error::{Result, TutorError};
use crate::providers::{CompletionRequest, CompletionResponse, Provider};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replies "OK:" followed by the most recent user message
#[derive(Debug, Default, Clone)]
pub struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        Ok(CompletionResponse::new(echo_reply(request)))
    }

    fn get_current_model(&self) -> Result<String> {
        Ok("echo".to_string())
    }
}

/// Fails every request with a provider error carrying `message`
#[derive(Debug, Clone)]
pub struct FailingProvider {
    pub message: String,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        Err(TutorError::Provider(self.message.clone()).into())
    }
}

/// Echoes after sleeping for `delay`
#[derive(Debug, Clone)]
pub struct SlowProvider {
    pub delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Provider for SlowProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(CompletionResponse::new(echo_reply(request)))
    }
}

/// Echoes and keeps a copy of every request it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(CompletionResponse::new(echo_reply(request)))
    }
}

fn echo_reply(request: &CompletionRequest) -> String {
    format!("OK:{}", request.last_user_content().unwrap_or_default())
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration that needs no credentials
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.provider_type = "ollama".to_string();
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
provider:
  type: ollama
  openai:
    model: gpt-3.5-turbo
  ollama:
    host: http://localhost:11434
    model: llama3.2:latest

tutor:
  history_window: 4
  max_tokens: 256
  temperature: 0.2
  request_timeout_seconds: 5
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatMessage;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::new(
            vec![ChatMessage::system("prompt"), ChatMessage::user(user)],
            10,
            0.0,
        )
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(TutorError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config();
        assert_eq!(config.provider.provider_type, "ollama");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml_parses() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.tutor.history_window, 4);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_echo_provider() {
        let response = EchoProvider.complete(&request("hi")).await.unwrap();
        assert_eq!(response.content, "OK:hi");
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let result = FailingProvider::new("boom").complete(&request("hi")).await;
        assert_error_contains(result, "boom");
    }

    #[tokio::test]
    async fn test_recording_provider_keeps_requests() {
        let provider = RecordingProvider::new();
        provider.complete(&request("one")).await.unwrap();
        provider.complete(&request("two")).await.unwrap();
        assert_eq!(provider.requests().len(), 2);
        assert_eq!(
            provider.last_request().unwrap().last_user_content(),
            Some("two")
        );
    }
}
