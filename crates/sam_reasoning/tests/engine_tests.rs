//! Integration tests for the SamEngine.
//!
//! These tests use a RecordingBackend that returns a canned reply and keeps
//! every request, so the full respond() pipeline can be checked without Ollama.

use anyhow::Result;
use async_trait::async_trait;
use sam_core::{Attachment, IncomingMessage, Persona, Role, SamConfig};
use sam_memory::SessionChatCache;
use sam_reasoning::api_types::{ChatMessage, ChatOptions, ChatResponse};
use sam_reasoning::llm::ChatBackend;
use sam_reasoning::{ImageError, SamEngine};
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Recording backend
// ============================================================================

#[derive(Debug, Clone)]
struct Recorded {
    model: String,
    messages: Vec<ChatMessage>,
    options: ChatOptions,
}

struct RecordingBackend {
    reply: String,
    fail: bool,
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingBackend {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    async fn last(&self) -> Recorded {
        self.calls.lock().await.last().cloned().expect("no backend call")
    }

    async fn count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ChatBackend for RecordingBackend {
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<ChatResponse> {
        self.calls.lock().await.push(Recorded {
            model: model.to_string(),
            messages,
            options,
        });
        if self.fail {
            anyhow::bail!("backend exploded");
        }
        Ok(ChatResponse::text(self.reply.clone()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn engine_with(
    config: &SamConfig,
    backend: Arc<RecordingBackend>,
    cache: &SessionChatCache,
) -> SamEngine {
    SamEngine::new(
        config,
        Persona::with_personality("You are SAM."),
        backend,
        Arc::new(cache.clone()),
    )
}

fn vision_config(dir: &std::path::Path) -> SamConfig {
    let mut config = SamConfig::default();
    config.vision.images_dir = dir.to_path_buf();
    config
}

// ============================================================================
// Text path
// ============================================================================

#[tokio::test]
async fn test_first_message_is_turn_one() {
    let backend = RecordingBackend::replying("hello Bob");
    let cache = SessionChatCache::default();
    let engine = engine_with(&SamConfig::default(), backend.clone(), &cache);

    let reply = engine
        .respond(&IncomingMessage::text("Bob", "KingBobby", "hi SAM"))
        .await
        .unwrap();
    assert_eq!(reply, vec!["hello Bob"]);

    let call = backend.last().await;
    assert_eq!(call.model, "SAM");
    assert_eq!(call.options.num_ctx, Some(8192));
    assert_eq!(call.options.temperature, Some(0.5));
    assert_eq!(call.messages.len(), 3);
    assert_eq!(call.messages[0].content, "You are SAM.");
    assert_eq!(call.messages[2].content, "[turn: 1] Bob (KingBobby): \"hi SAM\"");
}

#[tokio::test]
async fn test_history_in_flight_entry_is_dropped() {
    let backend = RecordingBackend::replying("ok");
    let cache = SessionChatCache::new(20);
    cache.record_user_message("Ann", "annie", "one").await;
    cache.record(Role::Assistant, "reply one").await;
    cache.record_user_message("Ann", "annie", "two").await;
    cache.record(Role::Assistant, "reply two").await;
    // The platform records the in-flight message before asking for a reply
    cache.record_user_message("Bob", "KingBobby", "three").await;

    let engine = engine_with(&SamConfig::default(), backend.clone(), &cache);
    engine
        .respond(&IncomingMessage::text("Bob", "KingBobby", "three"))
        .await
        .unwrap();

    let call = backend.last().await;
    assert_eq!(call.messages.len(), 7);
    assert_eq!(call.messages[3].role, Role::Assistant);
    assert_eq!(call.messages[5].content, "reply two");
    assert_eq!(call.messages[6].content, "[turn: 5] Bob (KingBobby): \"three\"");
    assert!(call.messages.iter().all(|m| m.images.is_empty()));
}

#[tokio::test]
async fn test_settled_history_is_kept() {
    let backend = RecordingBackend::replying("ok");
    let cache = SessionChatCache::new(20);
    cache.record(Role::User, "earlier").await;

    let mut config = SamConfig::default();
    config.history.tail = sam_core::HistoryTail::Settled;
    let engine = engine_with(&config, backend.clone(), &cache);
    engine
        .respond(&IncomingMessage::text("Bob", "b", "now"))
        .await
        .unwrap();

    let call = backend.last().await;
    assert_eq!(call.messages.len(), 4);
    assert_eq!(call.messages[3].content, "[turn: 2] Bob (b): \"now\"");
}

#[tokio::test]
async fn test_reply_is_escaped_and_split() {
    let long = format!("I'm fine\n{}", "x".repeat(30));
    let backend = RecordingBackend::replying(&long);
    let cache = SessionChatCache::default();
    let mut config = SamConfig::default();
    config.response.max_chunk_chars = 20;
    let engine = engine_with(&config, backend, &cache);

    let chunks = engine
        .respond(&IncomingMessage::text("Bob", "b", "how are you"))
        .await
        .unwrap();
    assert_eq!(chunks[0], "I\\'m fine");
    assert_eq!(chunks[1], "x".repeat(20));
    assert_eq!(chunks[2], "x".repeat(10));
}

#[tokio::test]
async fn test_text_backend_error_propagates() {
    let backend = RecordingBackend::failing();
    let cache = SessionChatCache::default();
    let engine = engine_with(&SamConfig::default(), backend.clone(), &cache);

    let err = engine
        .respond(&IncomingMessage::text("Bob", "b", "hi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("backend exploded"));
    assert_eq!(backend.count().await, 1);
}

// ============================================================================
// Image path
// ============================================================================

#[tokio::test]
async fn test_image_goes_to_vision_model_without_history() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cat.png"), b"hi").unwrap();

    let backend = RecordingBackend::replying("a cat");
    let cache = SessionChatCache::default();
    cache.record(Role::User, "unrelated history").await;
    let engine = engine_with(&vision_config(dir.path()), backend.clone(), &cache);

    let attachment = Attachment {
        filename: "cat.png".into(),
        url: "https://cdn.example/cat.png".into(),
        content_type: Some("image/png".into()),
        size: Some(2),
    };
    let message =
        IncomingMessage::text("Bob", "b", "what is this?").with_image("cat.png", vec![attachment]);
    let reply = engine.respond(&message).await.unwrap();
    assert_eq!(reply, vec!["a cat"]);

    let call = backend.last().await;
    assert_eq!(call.model, "gemma3");
    assert_eq!(call.options.num_ctx, Some(8192));
    assert_eq!(call.options.temperature, None);
    assert_eq!(call.messages.len(), 2);
    assert_eq!(call.messages[0].role, Role::System);
    assert_eq!(call.messages[0].content, "You are SAM.");
    assert_eq!(call.messages[1].content, "what is this?");
    assert_eq!(call.messages[1].images, vec!["aGk=".to_string()]);

    assert!(!dir.path().join("cat.png").exists(), "temp image not cleaned up");
}

#[tokio::test]
async fn test_image_cleaned_up_when_backend_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dog.jpg"), b"woof").unwrap();

    let backend = RecordingBackend::failing();
    let cache = SessionChatCache::default();
    let engine = engine_with(&vision_config(dir.path()), backend, &cache);

    let message = IncomingMessage::text("Bob", "b", "and this?").with_image("dog.jpg", vec![]);
    assert!(engine.respond(&message).await.is_err());
    assert!(!dir.path().join("dog.jpg").exists(), "temp image leaked on failure");
}

#[tokio::test]
async fn test_image_name_with_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let backend = RecordingBackend::replying("never");
    let cache = SessionChatCache::default();
    let engine = engine_with(&vision_config(dir.path()), backend.clone(), &cache);

    let message = IncomingMessage::text("Bob", "b", "x").with_image("../etc/passwd", vec![]);
    let err = engine.respond(&message).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ImageError>(),
        Some(ImageError::InvalidName(_))
    ));
    assert_eq!(backend.count().await, 0);
}

#[tokio::test]
async fn test_missing_image_does_not_call_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = RecordingBackend::replying("never");
    let cache = SessionChatCache::default();
    let engine = engine_with(&vision_config(dir.path()), backend.clone(), &cache);

    let message = IncomingMessage::text("Bob", "b", "x").with_image("gone.png", vec![]);
    assert!(engine.respond(&message).await.is_err());
    assert_eq!(backend.count().await, 0);
}

// ============================================================================
// Emotions
// ============================================================================

#[tokio::test]
async fn test_engine_owns_calm_emotions() {
    let backend = RecordingBackend::replying("ok");
    let cache = SessionChatCache::default();
    let engine = engine_with(&SamConfig::default(), backend, &cache);

    let (dominant, value) = engine.emotions().dominant().await;
    assert_eq!(dominant.len(), 6);
    assert!((value - 1.0 / 6.0).abs() < 1e-9);

    // Conversation does not move the emotions
    engine
        .respond(&IncomingMessage::text("Bob", "b", "hi"))
        .await
        .unwrap();
    assert_eq!(engine.emotions().dominant().await.0.len(), 6);

    engine.emotions().apply([("Happiness", 0.4)]).await;
    assert_eq!(
        engine.emotions().dominant().await.0,
        vec!["Happiness".to_string()]
    );
}

#[test]
fn test_default_config_uses_base_emotions() {
    let config = SamConfig::default();
    let expected: Vec<String> = sam_limbic::BASE_EMOTIONS
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(config.emotion.base_emotions, expected);
}
