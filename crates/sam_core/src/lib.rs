pub mod config;
pub mod persona;

pub use config::{HistoryTail, SamConfig};
pub use persona::Persona;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a conversation session, as stored by the history cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
}

impl ChatEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Metadata about a file attached to an incoming message.
/// Only logged; the image itself is handed over separately as `image_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A message received from the chat platform, already parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub author_name: String,
    pub author_nickname: String,
    pub content: String,
    /// File name of a downloaded image inside the temp image directory.
    #[serde(default)]
    pub image_file: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl IncomingMessage {
    pub fn text(author_name: &str, author_nickname: &str, content: &str) -> Self {
        Self {
            author_name: author_name.to_string(),
            author_nickname: author_nickname.to_string(),
            content: content.to_string(),
            image_file: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_image(mut self, image_file: &str, attachments: Vec<Attachment>) -> Self {
        self.image_file = Some(image_file.to_string());
        self.attachments = attachments;
        self
    }

    pub fn has_image(&self) -> bool {
        self.image_file.is_some()
    }
}

/// Source of the ordered chat history for the active conversation session.
#[async_trait]
pub trait SessionHistory: Send + Sync {
    async fn current_session_history(&self) -> anyhow::Result<Vec<ChatEntry>>;
}
