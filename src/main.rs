//! Essay Tutor - step-by-step essay writing coach
//!
#![doc = "Essay Tutor - step-by-step essay writing coach"]
#![doc = "Main entry point for the essay-tutor command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use essay_tutor::cli::{Cli, Commands};
use essay_tutor::commands;
use essay_tutor::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { session, .. } => {
            tracing::info!("Starting interactive tutoring session: {}", session);
            commands::chat::run_chat(config, session).await?;
            Ok(())
        }
        Commands::Ask {
            session, message, ..
        } => {
            tracing::debug!("Sending single message to session: {}", session);
            commands::ask::run_ask(config, session, message).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so replies on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "essay_tutor=debug"
    } else {
        "essay_tutor=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
