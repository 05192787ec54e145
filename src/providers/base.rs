//! Base provider trait and common types for Essay Tutor
//!
//! This module defines the Provider trait that every completion backend
//! implements, along with the wire-level chat message, the request that
//! carries decoding parameters, and the response structure.

use crate::error::Result;
use crate::tutor::{Message, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role tag on an outbound chat message
///
/// Unlike [`Role`], this includes `System`: the instructional prompt is only
/// ever materialised on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructional system prompt
    System,
    /// Student input
    User,
    /// Tutor reply
    Assistant,
}

impl From<Role> for ChatRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// Message structure sent to a completion provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: ChatRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::providers::{ChatMessage, ChatRole};
    ///
    /// let msg = ChatMessage::system("You are a helpful tutor");
    /// assert_eq!(msg.role, ChatRole::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role().into(),
            content: message.content().to_string(),
        }
    }
}

/// A complete outbound completion request
///
/// Carries the ordered messages (system prompt first) together with the
/// decoding parameters every provider must apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Ordered conversation, system instruction first
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Creates a new CompletionRequest
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::providers::{ChatMessage, CompletionRequest};
    ///
    /// let request = CompletionRequest::new(vec![ChatMessage::user("Hi")], 500, 0.7);
    /// assert_eq!(request.messages.len(), 1);
    /// assert_eq!(request.max_tokens, 500);
    /// ```
    pub fn new(messages: Vec<ChatMessage>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            messages,
            max_tokens,
            temperature,
        }
    }

    /// Content of the most recent user message, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the AI provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with generated text and optional token usage
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// The generated reply text
    pub content: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(content: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            content: content.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for completion backends
///
/// All providers (OpenAI, Ollama, test stubs) implement this trait. A
/// provider makes exactly one attempt per call; retries and timeouts are the
/// caller's concern.
///
/// # Examples
///
/// ```no_run
/// use essay_tutor::providers::{CompletionRequest, CompletionResponse, Provider};
/// use essay_tutor::error::Result;
/// use async_trait::async_trait;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl Provider for MyProvider {
///     async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new("Response"))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generates a reply for the given request
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Get the name of the currently active model
    ///
    /// # Default Implementation
    ///
    /// The default implementation returns an error indicating the model
    /// is not known.
    fn get_current_model(&self) -> Result<String> {
        Err(crate::error::TutorError::Provider(
            "Current model information is not available from this provider".to_string(),
        )
        .into())
    }
}
