use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use essay_tutor::error::{Result, TutorError};
use essay_tutor::providers::{CompletionRequest, CompletionResponse, Provider};

/// Replies "OK:" followed by the latest user message
#[allow(dead_code)]
pub struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        Ok(CompletionResponse::new(format!(
            "OK:{}",
            request.last_user_content().unwrap_or_default()
        )))
    }
}

/// Fails every call with a provider error
#[allow(dead_code)]
pub struct FailingProvider(pub &'static str);

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        Err(TutorError::Provider(self.0.to_string()).into())
    }
}

/// Echoes and records every request
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RecordingProvider {
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        EchoProvider.complete(request).await
    }
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
