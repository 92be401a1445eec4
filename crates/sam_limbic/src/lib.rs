//! # SAM Limbic System
//!
//! A small emotional state meant to color the bot's personality.
//!
//! - [`EmotionVector`] holds one weight per base emotion and keeps the
//!   weights normalized (non-negative, summing to 1) after every mutation.
//! - [`EmotionState`] owns a vector behind a lock so concurrent
//!   conversation turns can update it safely.

pub mod emotion;
mod system;

pub use emotion::{canonical_name, Emotion, EmotionVector, BASE_EMOTIONS};
pub use system::EmotionState;
