//! Command-line interface definition for Essay Tutor
//!
//! This module defines the CLI structure using clap's derive API,
//! providing an interactive chat command and a one-shot ask command.

use clap::{Parser, Subcommand};

/// Session id used when none is given on the command line
pub const DEFAULT_SESSION_ID: &str = "cli_session";

/// Essay Tutor - step-by-step essay writing coach
///
/// Chat with an AI tutor that guides you from topic selection through
/// brainstorming, outlining, drafting and revision.
#[derive(Parser, Debug, Clone)]
#[command(name = "essay-tutor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Essay Tutor
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive tutoring session
    Chat {
        /// Session identifier
        #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
        session: String,

        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the model for the selected provider
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single message and print the tutor's reply
    Ask {
        /// Session identifier
        #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
        session: String,

        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the model for the selected provider
        #[arg(short, long)]
        model: Option<String>,

        /// Message to send; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

impl Commands {
    /// Provider and model overrides carried by the command
    pub fn provider_overrides(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::Chat {
                provider, model, ..
            }
            | Self::Ask {
                provider, model, ..
            } => (provider.as_deref(), model.as_deref()),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat {
                session: DEFAULT_SESSION_ID.to_string(),
                provider: None,
                model: None,
            },
        }
    }
}
