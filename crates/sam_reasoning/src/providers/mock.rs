//! Mock provider with deterministic replies, for running without Ollama.

use crate::api_types::{ChatMessage, ChatOptions, ChatResponse};
use crate::llm::ChatBackend;
use anyhow::Result;

#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChatBackend for MockProvider {
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        _options: ChatOptions,
    ) -> Result<ChatResponse> {
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        let images: usize = messages.iter().map(|m| m.images.len()).sum();
        let text = if images > 0 {
            format!("(Mock {} Response) I looked at {} image(s).", model, images)
        } else {
            format!(
                "(Mock {} Response) I received {} message(s).",
                model,
                messages.len()
            )
        };
        Ok(ChatResponse::text(text))
    }
}
