//! Turn handling for the essay tutor
//!
//! [`TutorService`] composes a [`SessionStore`] with a completion
//! [`Provider`]. Each turn appends the student's message, sends the system
//! prompt plus a bounded window of recent history to the provider, appends
//! the reply (or a synthesized error reply) and returns the reply text.

use crate::config::{Config, TutorConfig};
use crate::error::{Result, TutorError};
use crate::prompts::tutor_system_prompt;
use crate::providers::{create_provider, ChatMessage, CompletionRequest, Provider};
use crate::tutor::session::{Message, Session, Stage};
use crate::tutor::store::SessionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Prefix of the assistant reply recorded when a completion fails
pub const ERROR_REPLY_PREFIX: &str = "Sorry, I encountered an error: ";

type TurnLock = Arc<tokio::sync::Mutex<()>>;

/// Conversational essay tutor
///
/// Owns its session store. Turns on the same session id are serialized so a
/// user message and its reply are always adjacent in the log; different ids
/// proceed independently.
///
/// # Examples
///
/// ```no_run
/// use essay_tutor::config::Config;
/// use essay_tutor::tutor::TutorService;
///
/// # async fn example() -> essay_tutor::error::Result<()> {
/// let mut config = Config::default();
/// config.provider.openai.api_key = Some("sk-...".to_string());
/// let tutor = TutorService::from_config(&config)?;
/// let reply = tutor.respond("web_session", "Help me pick a topic").await;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct TutorService {
    provider: Arc<dyn Provider>,
    store: SessionStore,
    config: TutorConfig,
    turn_locks: Mutex<HashMap<String, TurnLock>>,
}

impl TutorService {
    /// Creates a tutor around an existing provider
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Config` if the tutor settings are invalid
    pub fn new(provider: impl Provider + 'static, config: TutorConfig) -> Result<Self> {
        Self::with_provider(Arc::new(provider), config)
    }

    /// Creates a tutor around a boxed provider, as returned by
    /// [`create_provider`]
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Config` if the tutor settings are invalid
    pub fn new_boxed(provider: Box<dyn Provider>, config: TutorConfig) -> Result<Self> {
        Self::with_provider(Arc::from(provider), config)
    }

    /// Builds the configured provider and wraps it in a tutor
    ///
    /// # Errors
    ///
    /// Returns `TutorError::MissingCredentials` when the OpenAI provider is
    /// selected without an API key, or a configuration error for invalid
    /// settings. No session exists on failure.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let provider = create_provider(
            &config.provider.provider_type,
            &config.provider,
            Duration::from_secs(config.tutor.request_timeout_seconds),
        )?;
        Self::new_boxed(provider, config.tutor.clone())
    }

    fn with_provider(provider: Arc<dyn Provider>, config: TutorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            store: SessionStore::new(),
            config,
            turn_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Creates (or replaces) a session
    ///
    /// An existing session under the same id loses its history.
    pub async fn create_session(&self, session_id: &str) -> Session {
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;
        self.provision_session(session_id)
    }

    /// Runs one tutoring turn and returns the reply text
    ///
    /// Unknown ids are provisioned on first use. Completion failures never
    /// escape: they become an assistant reply starting with
    /// [`ERROR_REPLY_PREFIX`]. Either way the session grows by exactly one
    /// user message followed by one assistant message.
    ///
    /// `user_text` should be non-blank; the chat and ask front ends drop
    /// blank input before calling. Blank text is still recorded as a full
    /// turn so the pairing holds, and a warning is logged.
    pub async fn respond(&self, session_id: &str, user_text: impl Into<String>) -> String {
        let user_text = user_text.into();
        if user_text.trim().is_empty() {
            tracing::warn!(session_id = %session_id, "Responding to blank user text");
        }

        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;

        if !self.store.contains(session_id) {
            self.provision_session(session_id);
        }

        self.record(session_id, Message::user(user_text));

        let request = self.build_request(&self.store.history(session_id));
        let reply = match self.dispatch(&request).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(session_id = %session_id, "Completion failed: {}", e);
                format!("{}{}", ERROR_REPLY_PREFIX, e)
            }
        };

        self.record(session_id, Message::assistant(reply.clone()));
        reply
    }

    /// Snapshot of a session's messages; empty for unknown ids
    pub fn session_history(&self, session_id: &str) -> Vec<Message> {
        self.store.history(session_id)
    }

    /// Snapshot of a session, if it exists
    pub fn session_info(&self, session_id: &str) -> Option<Session> {
        self.store.get(session_id)
    }

    /// Clears a known session back to its initial state
    ///
    /// Returns false, without creating a session, when the id is unknown.
    pub async fn reset_session(&self, session_id: &str) -> bool {
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;

        let reset = self.store.reset(session_id);
        if reset {
            tracing::info!(session_id = %session_id, "Session reset");
        }
        reset
    }

    /// Sets or clears the essay topic of a session
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownSession` if the session does not exist
    pub fn set_topic(&self, session_id: &str, topic: Option<String>) -> Result<()> {
        self.store.set_topic(session_id, topic)
    }

    /// Moves a session to another workflow stage
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UnknownSession` if the session does not exist
    pub fn set_stage(&self, session_id: &str, stage: Stage) -> Result<()> {
        self.store.set_stage(session_id, stage)
    }

    /// Assembles the outbound request for a session history
    ///
    /// The system prompt comes first, followed by the last
    /// `history_window` messages in stored order.
    pub fn build_request(&self, history: &[Message]) -> CompletionRequest {
        let start = history.len().saturating_sub(self.config.history_window);
        let window = &history[start..];

        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(ChatMessage::system(tutor_system_prompt()));
        messages.extend(window.iter().map(ChatMessage::from));

        tracing::debug!(
            "Built completion request: {} of {} stored messages",
            window.len(),
            history.len()
        );

        CompletionRequest::new(messages, self.config.max_tokens, self.config.temperature)
    }

    /// Number of sessions held by the tutor
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The tutor settings in effect
    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Name of the model behind the provider, when it reports one
    pub fn model(&self) -> Option<String> {
        self.provider.get_current_model().ok()
    }

    fn provision_session(&self, session_id: &str) -> Session {
        let session = self.store.create(session_id);
        tracing::info!(session_id = %session_id, "Session created");
        session
    }

    fn record(&self, session_id: &str, message: Message) {
        // Sessions are never removed, so the id provisioned under the turn
        // lock is still present here.
        if let Err(e) = self.store.append(session_id, message) {
            tracing::error!(session_id = %session_id, "Failed to record message: {}", e);
        }
    }

    async fn dispatch(&self, request: &CompletionRequest) -> Result<String> {
        let secs = self.config.request_timeout_seconds;
        let response = tokio::time::timeout(
            Duration::from_secs(secs),
            self.provider.complete(request),
        )
        .await
        .map_err(|_| TutorError::Timeout(secs))??;

        if let Some(usage) = response.usage {
            tracing::debug!(
                "Completion usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(response.content)
    }

    fn turn_lock(&self, session_id: &str) -> TurnLock {
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatRole;
    use crate::test_utils::{EchoProvider, FailingProvider, RecordingProvider, SlowProvider};
    use crate::tutor::session::Role;

    fn tutor(provider: impl Provider + 'static) -> TutorService {
        TutorService::new(provider, TutorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_respond_echo_round_trip() {
        let tutor = tutor(EchoProvider);
        let reply = tutor.respond("s1", "hi").await;
        assert_eq!(reply, "OK:hi");

        let history = tutor.session_history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::User);
        assert_eq!(history[0].content(), "hi");
        assert_eq!(history[1].role(), Role::Assistant);
        assert_eq!(history[1].content(), "OK:hi");
    }

    #[tokio::test]
    async fn test_respond_provisions_unknown_session() {
        let tutor = tutor(EchoProvider);
        assert!(tutor.session_info("fresh").is_none());

        tutor.respond("fresh", "hello").await;

        let session = tutor.session_info("fresh").unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.stage(), Stage::TopicSelection);
        assert_eq!(session.topic(), None);
    }

    #[tokio::test]
    async fn test_respond_n_turns_alternate() {
        let tutor = tutor(EchoProvider);
        tutor.create_session("s1").await;
        for i in 0..5 {
            tutor.respond("s1", format!("turn {}", i)).await;
        }

        let history = tutor.session_history("s1");
        assert_eq!(history.len(), 10);
        for (i, message) in history.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected);
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_error_reply() {
        let tutor = tutor(FailingProvider::new("service unavailable"));
        let reply = tutor.respond("s1", "hi").await;

        assert!(reply.starts_with(ERROR_REPLY_PREFIX));
        assert!(reply.contains("service unavailable"));

        let history = tutor.session_history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role(), Role::Assistant);
        assert_eq!(history[1].content(), reply);
    }

    #[tokio::test]
    async fn test_error_reply_is_sent_back_as_history() {
        let provider = RecordingProvider::new();
        let tutor = tutor(provider.clone());
        tutor.create_session("s1").await;
        tutor
            .store()
            .append("s1", Message::user("earlier"))
            .unwrap();
        tutor
            .store()
            .append("s1", Message::assistant(format!("{}boom", ERROR_REPLY_PREFIX)))
            .unwrap();

        tutor.respond("s1", "again").await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 4);
        assert!(request.messages[2].content.starts_with(ERROR_REPLY_PREFIX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_error_reply() {
        let config = TutorConfig {
            request_timeout_seconds: 1,
            ..TutorConfig::default()
        };
        let tutor = TutorService::new(SlowProvider::new(Duration::from_secs(5)), config).unwrap();

        let reply = tutor.respond("s1", "hi").await;

        assert!(reply.starts_with(ERROR_REPLY_PREFIX));
        assert!(reply.contains("timed out after 1 seconds"));
        assert_eq!(tutor.session_history("s1").len(), 2);
    }

    #[tokio::test]
    async fn test_request_window_when_history_exceeds_limit() {
        let provider = RecordingProvider::new();
        let tutor = tutor(provider.clone());
        for i in 0..6 {
            tutor.respond("s1", format!("msg {}", i)).await;
        }

        // 11 stored when the last request was built; the oldest is dropped.
        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 11);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[0].content, tutor_system_prompt());
        assert_eq!(request.messages[10].content, "msg 5");
        assert_eq!(request.messages[1].content, "OK:msg 0");
        assert_eq!(request.max_tokens, 500);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_build_request_includes_all_when_under_limit() {
        let tutor = tutor(EchoProvider);
        let history = vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("c"),
        ];

        let request = tutor.build_request(&history);
        let roles: Vec<ChatRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert_eq!(request.messages[3].content, "c");
    }

    #[test]
    fn test_build_request_keeps_last_window() {
        let config = TutorConfig {
            history_window: 3,
            ..TutorConfig::default()
        };
        let tutor = TutorService::new(EchoProvider, config).unwrap();
        let history: Vec<Message> = (0..7).map(|i| Message::user(i.to_string())).collect();

        let request = tutor.build_request(&history);
        let contents: Vec<&str> = request
            .messages
            .iter()
            .skip(1)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["4", "5", "6"]);
    }

    #[test]
    fn test_build_request_empty_history() {
        let tutor = tutor(EchoProvider);
        let request = tutor.build_request(&[]);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ChatRole::System);
    }

    #[tokio::test]
    async fn test_reset_existing_session() {
        let tutor = tutor(EchoProvider);
        tutor.respond("s1", "hi").await;
        tutor.set_stage("s1", Stage::Outline).unwrap();

        assert!(tutor.reset_session("s1").await);

        let session = tutor.session_info("s1").unwrap();
        assert!(session.is_empty());
        assert_eq!(session.stage(), Stage::TopicSelection);
    }

    #[tokio::test]
    async fn test_reset_unknown_session() {
        let tutor = tutor(EchoProvider);
        assert!(!tutor.reset_session("ghost").await);
        assert!(tutor.session_info("ghost").is_none());
        assert!(tutor.session_history("ghost").is_empty());
    }

    #[tokio::test]
    async fn test_create_session_replaces_history() {
        let tutor = tutor(EchoProvider);
        tutor.respond("s1", "hi").await;
        let session = tutor.create_session("s1").await;
        assert!(session.is_empty());
        assert!(tutor.session_history("s1").is_empty());
    }

    #[tokio::test]
    async fn test_set_topic_requires_session() {
        let tutor = tutor(EchoProvider);
        assert!(tutor.set_topic("ghost", Some("Climate".to_string())).is_err());

        tutor.create_session("s1").await;
        tutor.set_topic("s1", Some("Climate".to_string())).unwrap();
        assert_eq!(tutor.session_info("s1").unwrap().topic(), Some("Climate"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_on_same_session_do_not_interleave() {
        let tutor = Arc::new(tutor(SlowProvider::new(Duration::from_millis(20))));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tutor = Arc::clone(&tutor);
                tokio::spawn(async move { tutor.respond("shared", format!("q{}", i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let history = tutor.session_history("shared");
        assert_eq!(history.len(), 16);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role(), Role::User);
            assert_eq!(pair[1].role(), Role::Assistant);
            assert_eq!(pair[1].content(), format!("OK:{}", pair[0].content()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_waits_for_turn_in_flight() {
        let tutor = Arc::new(tutor(SlowProvider::new(Duration::from_millis(200))));

        let turn = {
            let tutor = Arc::clone(&tutor);
            tokio::spawn(async move { tutor.respond("s1", "hi").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(tutor.reset_session("s1").await);
        assert_eq!(turn.await.unwrap(), "OK:hi");
        assert!(tutor.session_history("s1").is_empty());

        tutor.respond("s1", "again").await;
        let roles: Vec<Role> = tutor.session_history("s1").iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_session_waits_for_turn_in_flight() {
        let tutor = Arc::new(tutor(SlowProvider::new(Duration::from_millis(200))));

        let turn = {
            let tutor = Arc::clone(&tutor);
            tokio::spawn(async move { tutor.respond("s1", "hi").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        tutor.create_session("s1").await;
        turn.await.unwrap();
        assert!(tutor.session_history("s1").is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_still_records_full_turn() {
        let tutor = tutor(EchoProvider);
        let reply = tutor.respond("s1", "").await;

        assert_eq!(reply, "OK:");
        let history = tutor.session_history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), Role::User);
        assert_eq!(history[1].role(), Role::Assistant);
    }

    #[tokio::test]
    async fn test_session_count() {
        let tutor = tutor(EchoProvider);
        assert_eq!(tutor.session_count(), 0);
        tutor.respond("a", "hi").await;
        tutor.create_session("b").await;
        tutor.reset_session("ghost").await;
        assert_eq!(tutor.session_count(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TutorConfig {
            history_window: 0,
            ..TutorConfig::default()
        };
        assert!(TutorService::new(EchoProvider, config).is_err());
    }

    #[test]
    fn test_from_config_without_api_key_fails() {
        let config = Config::default();
        assert!(config.provider.openai.api_key.is_none());
        let err = TutorService::from_config(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TutorError>(),
            Some(TutorError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_model_reported_by_provider() {
        assert_eq!(tutor(EchoProvider).model().as_deref(), Some("echo"));
        assert_eq!(tutor(FailingProvider::new("x")).model(), None);
    }
}
