//! System prompts for the tutor
//!
//! The tutor uses a single static instruction; it does not vary per session
//! or per stage.

pub mod tutor_prompt;

pub use tutor_prompt::TUTOR_SYSTEM_PROMPT;

/// Returns the system prompt prepended to every completion request
///
/// # Examples
///
/// ```
/// use essay_tutor::prompts::tutor_system_prompt;
///
/// let prompt = tutor_system_prompt();
/// assert!(prompt.starts_with("You are an expert essay writing tutor"));
/// ```
pub fn tutor_system_prompt() -> &'static str {
    TUTOR_SYSTEM_PROMPT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tutor_system_prompt_is_stable() {
        assert_eq!(tutor_system_prompt(), TUTOR_SYSTEM_PROMPT);
        assert!(tutor_system_prompt().contains("essay"));
    }
}
