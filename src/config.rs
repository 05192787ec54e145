//! Configuration management for Essay Tutor
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TutorError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Provider types understood by [`crate::providers::create_provider`]
pub const VALID_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main configuration structure for Essay Tutor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration (OpenAI, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Tutor behaviour configuration
    #[serde(default)]
    pub tutor: TutorConfig,
}

/// Provider configuration
///
/// Specifies which completion provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Model to use for chat completions
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Optional API base URL (useful for tests, proxies and compatible servers)
    ///
    /// When unset, `https://api.openai.com/v1` is used.
    #[serde(default)]
    pub api_base: Option<String>,

    /// API key; normally supplied through `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_base: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Tutor behaviour configuration
///
/// Decoding parameters are applied to every request unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Number of most recent stored messages sent with each request
    ///
    /// Defaults to 10. Other values are an operator extension; they change
    /// what is sent, never what is stored.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Maximum tokens the provider may generate per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on a single completion request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_history_window() -> usize {
    10
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl TutorConfig {
    /// Validate the tutor settings
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Config` if any value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 {
            return Err(TutorError::Config(
                "tutor.history_window must be greater than 0".to_string(),
            )
            .into());
        }

        if self.max_tokens == 0 {
            return Err(
                TutorError::Config("tutor.max_tokens must be greater than 0".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TutorError::Config(
                "tutor.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.request_timeout_seconds == 0 {
            return Err(TutorError::Config(
                "tutor.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(TutorError::from)?;
        let config = serde_yaml::from_str(&contents).map_err(TutorError::from)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.trim().is_empty() {
                self.provider.openai.api_key = Some(api_key);
            }
        }

        if let Ok(provider_type) = std::env::var("ESSAY_TUTOR_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("ESSAY_TUTOR_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("ESSAY_TUTOR_OPENAI_API_BASE") {
            self.provider.openai.api_base = Some(api_base);
        }

        if let Ok(host) = std::env::var("ESSAY_TUTOR_OLLAMA_HOST") {
            self.provider.ollama.host = host;
        }

        if let Ok(model) = std::env::var("ESSAY_TUTOR_OLLAMA_MODEL") {
            self.provider.ollama.model = model;
        }

        if let Ok(window) = std::env::var("ESSAY_TUTOR_HISTORY_WINDOW") {
            if let Ok(value) = window.parse() {
                self.tutor.history_window = value;
            } else {
                tracing::warn!("Invalid ESSAY_TUTOR_HISTORY_WINDOW: {}", window);
            }
        }

        if let Ok(max_tokens) = std::env::var("ESSAY_TUTOR_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.tutor.max_tokens = value;
            } else {
                tracing::warn!("Invalid ESSAY_TUTOR_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(temperature) = std::env::var("ESSAY_TUTOR_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.tutor.temperature = value;
            } else {
                tracing::warn!("Invalid ESSAY_TUTOR_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(timeout) = std::env::var("ESSAY_TUTOR_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.tutor.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ESSAY_TUTOR_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let (provider, model) = cli.command.provider_overrides();

        if let Some(provider) = provider {
            tracing::debug!("CLI override: provider={}", provider);
            self.provider.provider_type = provider.to_string();
        }

        if let Some(model) = model {
            tracing::debug!("CLI override: model={}", model);
            match self.provider.provider_type.as_str() {
                "ollama" => self.provider.ollama.model = model.to_string(),
                _ => self.provider.openai.model = model.to_string(),
            }
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set. Credentials are checked
    /// when the provider is constructed, not here.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(TutorError::Config("Provider type cannot be empty".to_string()).into());
        }

        if !VALID_PROVIDERS.contains(&self.provider.provider_type.as_str()) {
            return Err(TutorError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                VALID_PROVIDERS.join(", ")
            ))
            .into());
        }

        self.tutor.validate()
    }
}
