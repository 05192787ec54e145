/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`: interactive tutoring session
- `ask`: send one message and print the reply

Both build a `TutorService` from configuration and drive it; all tutoring
behaviour lives in the library's `tutor` module.
*/

use crate::config::Config;
use crate::error::Result;
use crate::tutor::{Message, Role, Session, TutorService, ERROR_REPLY_PREFIX};

// Special commands parser for the chat loop
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds a `TutorService`, provisions the session and runs a
    //! readline-based loop that sends each line to the tutor.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::error::TutorError;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive tutoring session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session_id` - Session to converse in
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be built (for example a missing
    /// OpenAI API key) or the line editor cannot be initialised
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::commands::chat;
    /// use essay_tutor::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), "cli_session".to_string()).await?;
    /// ```
    pub async fn run_chat(config: Config, session_id: String) -> Result<()> {
        let tutor = TutorService::from_config(&config)?;
        tutor.create_session(&session_id).await;

        let mut rl = DefaultEditor::new().map_err(TutorError::from)?;

        print_welcome_banner(&session_id, tutor.model().as_deref());

        loop {
            match rl.readline(&format!("{} ", "You:".green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::Reset => {
                            tutor.reset_session(&session_id).await;
                            println!("{}", "Session reset. Let's start fresh!".cyan());
                            continue;
                        }
                        SpecialCommand::History => {
                            print_history(&tutor.session_history(&session_id));
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            if let Some(session) = tutor.session_info(&session_id) {
                                print_status_display(&session, tutor.model().as_deref());
                            }
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::SetTopic(topic) => {
                            let message = match &topic {
                                Some(t) => format!("Topic set to: {}", t),
                                None => "Topic cleared".to_string(),
                            };
                            match tutor.set_topic(&session_id, topic) {
                                Ok(()) => println!("{}", message.cyan()),
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::SetStage(stage) => {
                            match tutor.set_stage(&session_id, stage) {
                                Ok(()) => println!("{}", format!("Stage set to: {}", stage).cyan()),
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::None => {
                            // Regular message for the tutor
                        }
                    }

                    rl.add_history_entry(trimmed).map_err(TutorError::from)?;

                    let reply = tutor.respond(&session_id, trimmed).await;
                    print_reply(&reply);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye! Keep practicing your essay writing!");
        Ok(())
    }

    fn print_welcome_banner(session_id: &str, model: Option<&str>) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            Essay Writing Tutor - Welcome!                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session: {}", session_id.cyan());
        if let Some(model) = model {
            println!("Model:   {}", model.cyan());
        }
        println!("\nType '/help' for available commands, 'quit' to exit\n");
    }

    fn print_status_display(session: &Session, model: Option<&str>) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                  Essay Tutor Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:  {}", session.id());
        println!("Topic:    {}", session.topic().unwrap_or("(not set)"));
        println!("Stage:    {}", session.stage());
        println!("Messages: {}", session.len());
        println!(
            "Started:  {}",
            session.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("Model:    {}", model.unwrap_or("unknown"));
        println!();
    }

    fn print_history(history: &[Message]) {
        println!("\n{}", "Conversation History:".bold());
        if history.is_empty() {
            println!("(no messages yet)");
        }
        for message in history {
            println!("{}", format_history_line(message));
        }
        println!();
    }

    fn print_reply(reply: &str) {
        if is_error_reply(reply) {
            println!("{} {}", "Tutor:".blue().bold(), reply.yellow());
        } else {
            println!("{} {}", "Tutor:".blue().bold(), reply);
        }
    }
}

// One-shot ask command handler
pub mod ask {
    //! Single-turn handler: one message in, one reply out.

    use super::*;
    use crate::error::TutorError;

    /// Send one message to the tutor and print the reply to stdout
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session_id` - Session to converse in
    /// * `message` - Message words, joined with single spaces
    ///
    /// # Errors
    ///
    /// Returns error if the message is blank or the provider cannot be built.
    /// A failed completion is not an error: its error reply is printed.
    pub async fn run_ask(config: Config, session_id: String, message: Vec<String>) -> Result<()> {
        let text = message.join(" ");
        let text = text.trim();
        if text.is_empty() {
            return Err(TutorError::Config("Message cannot be empty".to_string()).into());
        }

        let tutor = TutorService::from_config(&config)?;
        tutor.create_session(&session_id).await;

        let reply = tutor.respond(&session_id, text).await;
        if is_error_reply(&reply) {
            tracing::warn!("Tutor returned an error reply");
        }
        println!("{}", reply);
        Ok(())
    }
}

/// True when a reply was synthesized from a failed completion
pub fn is_error_reply(reply: &str) -> bool {
    reply.starts_with(ERROR_REPLY_PREFIX)
}

/// Render one stored message as `Role: content`
///
/// # Examples
///
/// ```
/// use essay_tutor::commands::format_history_line;
/// use essay_tutor::tutor::Message;
///
/// assert_eq!(format_history_line(&Message::user("hi")), "User: hi");
/// ```
pub fn format_history_line(message: &Message) -> String {
    let label = match message.role() {
        Role::User => "User",
        Role::Assistant => "Assistant",
    };
    format!("{}: {}", label, message.content())
}
