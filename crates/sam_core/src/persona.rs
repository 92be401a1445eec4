use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Built-in personality, used when no persona file is configured.
/// The same text is baked into the provisioned chat model as its system prompt.
const DEFAULT_PERSONALITY: &str = "\
You are SAM, a member of this chat server.
You have your own opinions, moods and sense of humour, and you talk like a person, not like an assistant.
Keep replies short and conversational unless someone asks for detail.
Never claim to remember things you were not shown.";

/// Describes the `[turn: N] Username (nickname): content` input protocol and
/// the reply rules. Sent as the second system message of every text prompt.
const PROTOCOL_INSTRUCTIONS: &str = r#"
Input:
- You will receive ONE message in the format: [turn: (turn number)] Username (nickname): content
- The turn number is to help keep the order of the messages.

Input Example:
[turn: 7] Bob (KingBobby): How are you feeling today?

Behavior:
- Reply to the content of the message. Use the username only if it improves clarity.
- Do not invent server history, quotes, or prior messages you cannot see.
- Do not impersonate other users.

Output:
- Respond with ONLY the message content.
- Do NOT include turn numbers or your username.
- If any of the above appear, the response is invalid.

Output Example:
How are you feeling today?

- If your draft response contains any input formatting, rewrite it to remove all input style formatting before returning it.
"#;

/// The bot's fixed system-level texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Personality text, prepended to every prompt (text and vision).
    pub personality: String,
    /// Input/output protocol instructions, text prompts only.
    pub protocol: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            personality: DEFAULT_PERSONALITY.to_string(),
            protocol: PROTOCOL_INSTRUCTIONS.to_string(),
        }
    }
}

impl Persona {
    pub fn with_personality(personality: impl Into<String>) -> Self {
        Self {
            personality: personality.into(),
            ..Default::default()
        }
    }

    /// Load the personality text from a file.
    /// A missing or blank file falls back to the built-in personality.
    pub async fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!("Loaded persona from {}", path.display());
                Self::with_personality(text.trim().to_string())
            }
            Ok(_) => {
                tracing::warn!("Persona file {} is empty, using built-in persona", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read persona file {} ({}), using built-in persona",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
