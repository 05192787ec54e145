//! Essay Tutor - conversational essay writing tutor library
//!
//! This library keeps per-session chat history and forwards it, with a fixed
//! instructional prompt, to a remote completion provider to produce tutor
//! replies.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `tutor`: Session model, in-memory session store and the turn-handling service
//! - `providers`: Completion provider abstraction and implementations (OpenAI, Ollama)
//! - `prompts`: The static tutoring system prompt
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for the CLI commands
//!
//! # Example
//!
//! ```no_run
//! use essay_tutor::{Config, TutorService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let tutor = TutorService::from_config(&config)?;
//!     let reply = tutor.respond("web_session", "I need help choosing a topic").await;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod tutor;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TutorError};
pub use tutor::{Message, Role, Session, SessionStore, Stage, TutorService};

#[cfg(test)]
pub mod test_utils;
