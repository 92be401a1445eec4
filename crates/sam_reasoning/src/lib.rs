pub mod api_types;
pub mod dispatch;
pub mod engine;
pub mod format;
pub mod image;
pub mod llm;
pub mod prompts;
pub mod providers;

pub use dispatch::{ChatDispatcher, VisionDispatcher};
pub use engine::SamEngine;
pub use format::ResponseFormatter;
pub use image::{ImageError, TempImage};
pub use llm::ChatBackend;
pub use prompts::{AssembledPrompt, ConversationAssembler};
