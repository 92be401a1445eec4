use crate::api_types::{ChatMessage, ChatOptions, ChatResponse};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one non-streaming chat request and wait for the full reply.
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<ChatResponse>;
}

// Providers available in crate::providers
