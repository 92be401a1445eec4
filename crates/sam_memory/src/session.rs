//! In-memory session chat cache.
//!
//! Holds the most recent entries of the active conversation, oldest first.
//! The oldest entries fall off once `max_entries` is reached.

use anyhow::Result;
use async_trait::async_trait;
use sam_core::{ChatEntry, Role, SessionHistory};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct SessionChatCache {
    entries: Arc<RwLock<VecDeque<ChatEntry>>>,
    max_entries: usize,
}

impl SessionChatCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_entries.min(256)))),
            max_entries: max_entries.max(1),
        }
    }

    /// Append an entry, evicting the oldest one when full.
    pub async fn record(&self, role: Role, content: impl Into<String>) {
        let mut entries = self.entries.write().await;
        if entries.len() == self.max_entries {
            entries.pop_front();
        }
        entries.push_back(ChatEntry::new(role, content));
        tracing::trace!("Session cache holds {} entries", entries.len());
    }

    /// Record an incoming user message the way the assembler expects to see
    /// settled turns: `Name (nickname): "message"`.
    pub async fn record_user_message(&self, name: &str, nickname: &str, message: &str) {
        self.record(Role::User, format!("{} ({}): \"{}\"", name, nickname, message))
            .await;
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
        tracing::info!("Session chat cache cleared");
    }
}

impl Default for SessionChatCache {
    fn default() -> Self {
        Self::new(50)
    }
}

#[async_trait]
impl SessionHistory for SessionChatCache {
    async fn current_session_history(&self) -> Result<Vec<ChatEntry>> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }
}
