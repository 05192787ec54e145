//! Special commands parser for interactive chat mode
//!
//! This module parses the commands a student can enter during an interactive
//! tutoring session instead of a message to the tutor:
//! - Exit the session
//! - Reset the conversation
//! - Show the conversation history or session status
//! - Record the essay topic or workflow stage
//!
//! Commands are prefixed with `/` and are case-insensitive. The single-word
//! session controls (`quit`, `exit`, `reset`, `history`) also work without
//! the prefix.

use crate::tutor::Stage;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session or print information, rather than
/// being sent to the tutor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the conversation and start over
    Reset,

    /// Print every message exchanged so far
    History,

    /// Show session id, topic, stage, message count and model
    ShowStatus,

    /// Display help information
    Help,

    /// Set the essay topic, or clear it when no text is given
    SetTopic(Option<String>),

    /// Move the session to another workflow stage
    SetStage(Stage),

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the tutor as a regular message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument for an unrecognised stage name.
/// Returns CommandError::MissingArgument if `/stage` is given without a stage.
///
/// # Examples
///
/// ```
/// use essay_tutor::commands::special_commands::{parse_special_command, SpecialCommand};
/// use essay_tutor::tutor::Stage;
///
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("/RESET").unwrap(), SpecialCommand::Reset);
/// assert_eq!(
///     parse_special_command("/stage outline").unwrap(),
///     SpecialCommand::SetStage(Stage::Outline)
/// );
/// assert_eq!(
///     parse_special_command("help me with my thesis").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "exit" | "quit" => return Ok(SpecialCommand::Exit),
        "reset" => return Ok(SpecialCommand::Reset),
        "history" => return Ok(SpecialCommand::History),
        _ => {}
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(SpecialCommand::None);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name.to_lowercase(), arg.trim()),
        None => (rest.to_lowercase(), ""),
    };

    match name.as_str() {
        "exit" | "quit" | "q" => Ok(SpecialCommand::Exit),
        "reset" | "new" => Ok(SpecialCommand::Reset),
        "history" => Ok(SpecialCommand::History),
        "status" => Ok(SpecialCommand::ShowStatus),
        "help" | "?" => Ok(SpecialCommand::Help),
        "topic" if arg.is_empty() => Ok(SpecialCommand::SetTopic(None)),
        "topic" => Ok(SpecialCommand::SetTopic(Some(arg.to_string()))),
        "stage" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/stage".to_string(),
            usage: format!("/stage <{}>", stage_names().join("|")),
        }),
        "stage" => Stage::parse_str(arg)
            .map(SpecialCommand::SetStage)
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/stage".to_string(),
                arg: arg.to_string(),
            }),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn stage_names() -> Vec<&'static str> {
    Stage::ALL.iter().map(Stage::as_str).collect()
}

/// Print help information for special commands
///
/// # Examples
///
/// ```
/// use essay_tutor::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Tutoring
=========================================

SESSION CONTROL:
  /reset          - Clear the conversation and start over
  reset           - Same as /reset
  /new            - Same as /reset
  exit            - Exit interactive mode
  quit            - Same as exit

SESSION INFORMATION:
  /history        - Show the conversation so far
  history         - Same as /history
  /status         - Show session topic, stage and message count
  /help           - Show this help message
  /?              - Same as /help

ESSAY PROGRESS:
  /topic <text>   - Record the topic of your essay
  /topic          - Clear the recorded topic
  /stage <name>   - Record where you are: {}

NOTES:
  - Commands are case-insensitive
  - Everything else you type is sent to the tutor
"#,
        stage_names().join(", ")
    );
}
