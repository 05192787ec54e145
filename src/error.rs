//! Error types for Essay Tutor
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Essay Tutor operations
///
/// Construction-time variants (`Config`, `MissingCredentials`) are fatal and
/// surface to whoever builds the service. Provider-side variants are caught
/// by [`crate::tutor::TutorService::respond`] and turned into an in-band
/// assistant reply, so they never reach a chat caller.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Mutation attempted against a session id the store does not know
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// Provider-related errors (API calls, malformed responses, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Completion request did not finish within the configured bound
    #[error("Completion request timed out after {0} seconds")]
    Timeout(u64),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Interactive line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Essay Tutor operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need the error kind downcast to [`TutorError`].
pub type Result<T> = anyhow::Result<T>;
