//! Backend dispatch for text and image messages.

use crate::api_types::{ChatMessage, ChatOptions};
use crate::image::TempImage;
use crate::llm::ChatBackend;
use anyhow::{Context, Result};
use sam_core::config::{LlmConfig, VisionConfig};
use sam_core::{Attachment, Persona};
use std::path::PathBuf;
use std::sync::Arc;

/// Sends assembled text prompts to the chat model.
#[derive(Clone)]
pub struct ChatDispatcher {
    backend: Arc<dyn ChatBackend>,
    model: String,
    options: ChatOptions,
}

impl ChatDispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>, model: &str, num_ctx: u32, temperature: f32) -> Self {
        Self {
            backend,
            model: model.to_string(),
            options: ChatOptions {
                num_ctx: Some(num_ctx),
                temperature: Some(temperature),
            },
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &LlmConfig) -> Self {
        Self::new(backend, &config.chat_model, config.num_ctx, config.temperature)
    }

    /// Returns the raw reply text. Backend errors are passed through as-is.
    pub async fn dispatch(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let response = self
            .backend
            .chat(&self.model, messages, self.options.clone())
            .await?;
        Ok(response.message.content)
    }
}

/// Sends one image plus its caption to the vision model.
///
/// No conversation history is included; the prompt is the persona and a
/// single user message.
#[derive(Clone)]
pub struct VisionDispatcher {
    backend: Arc<dyn ChatBackend>,
    persona: Arc<Persona>,
    model: String,
    options: ChatOptions,
    images_dir: PathBuf,
}

impl VisionDispatcher {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        persona: Arc<Persona>,
        model: &str,
        num_ctx: u32,
        images_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            persona,
            model: model.to_string(),
            // Temperature stays at the model default for vision
            options: ChatOptions {
                num_ctx: Some(num_ctx),
                temperature: None,
            },
            images_dir,
        }
    }

    pub fn from_config(
        backend: Arc<dyn ChatBackend>,
        persona: Arc<Persona>,
        config: &VisionConfig,
    ) -> Self {
        Self::new(
            backend,
            persona,
            &config.model,
            config.num_ctx,
            config.images_dir.clone(),
        )
    }

    /// Analyze `image_file` from the temp image directory.
    ///
    /// The image is deleted when this returns, on success and on error.
    pub async fn dispatch(
        &self,
        user_message: &str,
        image_file: &str,
        attachments: &[Attachment],
    ) -> Result<String> {
        let image = TempImage::resolve(&self.images_dir, image_file)?;

        tracing::debug!("Attachments: {:?}", attachments);
        tracing::info!("Analyzing image ({})...", image_file);

        let encoded = image
            .read_base64()
            .await
            .with_context(|| format!("Failed to load image {}", image_file))?;

        let messages = vec![
            ChatMessage::system(self.persona.personality.clone()),
            ChatMessage::user(user_message).with_images(vec![encoded]),
        ];

        let response = self
            .backend
            .chat(&self.model, messages, self.options.clone())
            .await?;
        Ok(response.message.content)
    }
}
