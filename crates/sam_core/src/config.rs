use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SamConfig {
    pub llm: LlmConfig,
    pub vision: VisionConfig,
    pub persona: PersonaConfig,
    pub history: HistoryConfig,
    pub response: ResponseConfig,
    pub emotion: EmotionConfig,
}

impl SamConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SamConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OLLAMA_BASE_URL") {
            self.llm.base_url = v;
        }
        // The key is not validated here; a local Ollama needs none.
        if let Ok(v) = std::env::var("OLLAMA_API") {
            if !v.is_empty() {
                self.llm.api_key = Some(v);
            }
        }
        if let Ok(v) = std::env::var("SAM_CHAT_MODEL") {
            self.llm.chat_model = v;
        }
        if let Ok(v) = std::env::var("SAM_BASE_MODEL") {
            self.llm.base_model = v;
        }
        if let Ok(v) = std::env::var("SAM_VISION_MODEL") {
            self.vision.model = v;
        }
        if let Ok(v) = std::env::var("SAM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Name of the provisioned chat model.
    pub chat_model: String,
    /// Model the chat model is created from at startup.
    pub base_model: String,
    /// Context window in tokens.
    pub num_ctx: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            chat_model: "SAM".to_string(),
            base_model: "huihui_ai/deepseek-r1-abliterated".to_string(),
            num_ctx: 8192,
            temperature: 0.5,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub model: String,
    pub num_ctx: u32,
    /// Directory holding downloaded images awaiting analysis.
    pub images_dir: PathBuf,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "gemma3".to_string(),
            num_ctx: 8192,
            images_dir: PathBuf::from("tools/vision/images_temp"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Optional file overriding the built-in personality text.
    pub file: Option<PathBuf>,
}

/// Whether the session history handed to the assembler still contains the
/// message currently being answered as its last entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTail {
    /// The last entry is the in-flight message and is dropped before assembly.
    #[default]
    InFlightIncluded,
    /// The history only holds settled turns and is used as-is.
    Settled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub tail: HistoryTail,
    /// Maximum entries kept by the in-memory session cache.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            tail: HistoryTail::InFlightIncluded,
            max_entries: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Platform message length limit, in characters.
    pub max_chunk_chars: usize,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    pub base_emotions: Vec<String>,
}

// Kept in step with sam_limbic::BASE_EMOTIONS
impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            base_emotions: ["Anger", "Disgust", "Fear", "Happiness", "Sadness", "Surprise"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
