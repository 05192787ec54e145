//! Session and message data model
//!
//! A [`Session`] is the per-identifier conversation context: an optional
//! essay topic, a coarse workflow [`Stage`], and the ordered log of
//! [`Message`]s exchanged so far. The system prompt is never stored here; it
//! is synthesized for every outbound request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the student
    User,
    /// Reply produced by the tutor (or a synthesized error reply)
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse position of a session in the essay-writing workflow
///
/// Stored for collaborators to display and update. Nothing in the turn
/// handling path changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Choosing a clear, focused topic
    #[default]
    TopicSelection,
    /// Generating and organizing ideas
    Brainstorming,
    /// Building a structured outline
    Outline,
    /// Drafting paragraphs
    Writing,
    /// Reviewing and improving the draft
    Revision,
}

impl Stage {
    /// All stages in workflow order
    pub const ALL: [Stage; 5] = [
        Stage::TopicSelection,
        Stage::Brainstorming,
        Stage::Outline,
        Stage::Writing,
        Stage::Revision,
    ];

    /// Parse a stage from its name
    ///
    /// Accepts the snake_case name, case-insensitively, with `-` or spaces
    /// in place of underscores.
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::tutor::Stage;
    ///
    /// assert_eq!(Stage::parse_str("outline").unwrap(), Stage::Outline);
    /// assert_eq!(Stage::parse_str("Topic-Selection").unwrap(), Stage::TopicSelection);
    /// assert!(Stage::parse_str("publishing").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| format!("Unknown stage: {}", s.trim()))
    }

    /// Snake_case name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopicSelection => "topic_selection",
            Self::Brainstorming => "brainstorming",
            Self::Outline => "outline",
            Self::Writing => "writing",
            Self::Revision => "revision",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a session's message log
///
/// Messages are immutable once created; fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current instant
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self::with_timestamp(role, content, Utc::now())
    }

    /// Creates a message with an explicit timestamp
    pub fn with_timestamp(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::tutor::{Message, Role};
    ///
    /// let msg = Message::user("Help me pick a topic");
    /// assert_eq!(msg.role(), Role::User);
    /// assert_eq!(msg.content(), "Help me pick a topic");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Conversation state for one session id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    topic: Option<String>,
    stage: Stage,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session at the initial stage
    ///
    /// # Examples
    ///
    /// ```
    /// use essay_tutor::tutor::{Session, Stage};
    ///
    /// let session = Session::new("web_session");
    /// assert_eq!(session.id(), "web_session");
    /// assert_eq!(session.stage(), Stage::TopicSelection);
    /// assert!(session.messages().is_empty());
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: None,
            stage: Stage::default(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Messages in append order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message to the end of the log
    ///
    /// A timestamp earlier than the last stored one (wall-clock step back)
    /// is clamped up to it so the log stays non-decreasing.
    pub(crate) fn push(&mut self, mut message: Message) {
        if let Some(last) = self.messages.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        self.messages.push(message);
    }

    pub(crate) fn set_topic(&mut self, topic: Option<String>) {
        self.topic = topic;
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }
}
