use sam_core::{ChatEntry, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Base64-encoded images, vision requests only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

impl From<ChatEntry> for ChatMessage {
    fn from(entry: ChatEntry) -> Self {
        Self::new(entry.role, entry.content)
    }
}

impl From<&ChatEntry> for ChatMessage {
    fn from(entry: &ChatEntry) -> Self {
        Self::new(entry.role, entry.content.clone())
    }
}

/// Decoding options. Unset fields are left to the backend's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// Request payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

// Response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default = "assistant_role")]
    pub role: Role,
    pub content: String,
}

fn assistant_role() -> Role {
    Role::Assistant
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: ResponseMessage {
                role: Role::Assistant,
                content: content.into(),
            },
            done: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateModelRequest {
    pub model: String,
    pub from: String,
    pub system: String,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateModelResponse {
    pub status: String,
}
