//! Conversation entry point.
//!
//! `SamEngine::respond` routes a message to the chat or vision model and
//! returns the reply as sendable chunks.

use crate::dispatch::{ChatDispatcher, VisionDispatcher};
use crate::format::ResponseFormatter;
use crate::llm::ChatBackend;
use crate::prompts::ConversationAssembler;
use anyhow::Result;
use sam_core::{Attachment, IncomingMessage, Persona, SamConfig, SessionHistory};
use sam_limbic::EmotionState;
use std::sync::Arc;

pub struct SamEngine {
    assembler: ConversationAssembler,
    chat: ChatDispatcher,
    vision: VisionDispatcher,
    formatter: ResponseFormatter,
    history: Arc<dyn SessionHistory>,
    emotions: EmotionState,
}

impl SamEngine {
    /// Build an engine whose chat and vision calls both go to `backend`.
    pub fn new(
        config: &SamConfig,
        persona: Persona,
        backend: Arc<dyn ChatBackend>,
        history: Arc<dyn SessionHistory>,
    ) -> Self {
        let persona = Arc::new(persona);
        Self {
            assembler: ConversationAssembler::new(persona.clone(), config.history.tail),
            chat: ChatDispatcher::from_config(backend.clone(), &config.llm),
            vision: VisionDispatcher::from_config(backend, persona, &config.vision),
            formatter: ResponseFormatter::new(config.response.max_chunk_chars),
            history,
            emotions: EmotionState::from_names(&config.emotion.base_emotions),
        }
    }

    pub fn emotions(&self) -> &EmotionState {
        &self.emotions
    }

    /// Answer one message as sendable chunks.
    /// Errors from the backend propagate to the caller.
    pub async fn respond(&self, message: &IncomingMessage) -> Result<Vec<String>> {
        let reply = self.reply(message).await?;
        Ok(self.format(&reply))
    }

    /// Route a message to the chat or vision model and return the raw reply.
    pub async fn reply(&self, message: &IncomingMessage) -> Result<String> {
        match &message.image_file {
            None => {
                self.converse(
                    &message.author_name,
                    &message.author_nickname,
                    &message.content,
                )
                .await
            }
            Some(image_file) => {
                self.converse_image(&message.content, image_file, &message.attachments)
                    .await
            }
        }
    }

    /// Escape and split a raw reply.
    pub fn format(&self, raw: &str) -> Vec<String> {
        self.formatter.format(raw)
    }

    /// Text path: history-aware prompt to the chat model. Returns raw text.
    pub async fn converse(&self, name: &str, nickname: &str, text: &str) -> Result<String> {
        let history = self.history.current_session_history().await?;
        let prompt = self.assembler.assemble(name, nickname, text, &history);
        tracing::debug!(
            "Turn {} for {} ({}), {} prompt messages",
            prompt.turn_number,
            name,
            nickname,
            prompt.messages.len()
        );
        self.chat.dispatch(prompt.messages).await
    }

    /// Image path: persona plus one captioned image to the vision model.
    pub async fn converse_image(
        &self,
        text: &str,
        image_file: &str,
        attachments: &[Attachment],
    ) -> Result<String> {
        self.vision.dispatch(text, image_file, attachments).await
    }
}
