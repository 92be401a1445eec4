//! Ollama provider.
//!
//! Talks to the native API (`/api/chat`, `/api/create`) rather than the
//! OpenAI-compatible one, because only the native API accepts `num_ctx`
//! and inline base64 images.

use crate::api_types::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, CreateModelRequest, CreateModelResponse,
};
use crate::llm::ChatBackend;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use sam_core::config::LlmConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        let builder = self.client.post(format!("{}{}", self.base_url, endpoint));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Create (or update) a named model from a base model with a baked-in
    /// system prompt. Returns the status reported by Ollama.
    pub async fn create_model(&self, name: &str, base_model: &str, system: &str) -> Result<String> {
        let payload = CreateModelRequest {
            model: name.to_string(),
            from: base_model.to_string(),
            system: system.to_string(),
            stream: false,
        };

        let response = self
            .post("/api/create")
            .json(&payload)
            .send()
            .await
            .context("Failed to send create request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let err_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama create error {}: {}", status, err_text);
        }

        let created: CreateModelResponse = response
            .json()
            .await
            .context("Failed to parse Ollama create response")?;
        Ok(created.status)
    }
}

/// True when the error chain shows Ollama could not be reached at all.
pub fn is_unreachable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|e| e.is_connect())
            .unwrap_or(false)
    })
}

#[async_trait::async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<ChatResponse> {
        let payload = ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
            options,
        };

        tracing::debug!(
            "Ollama chat: model={} messages={}",
            payload.model,
            payload.messages.len()
        );

        let response = self
            .post("/api/chat")
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let err_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama error {}: {}", status, err_text);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama chat response")?;
        Ok(parsed)
    }
}
