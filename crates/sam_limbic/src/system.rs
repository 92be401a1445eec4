//! Shared ownership of the emotion vector.
//!
//! `add_delta` is a read-modify-write over the whole map, so concurrent
//! conversation turns must go through the write lock.

use crate::emotion::EmotionVector;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to one process-wide emotion vector.
#[derive(Debug, Clone, Default)]
pub struct EmotionState {
    vector: Arc<RwLock<EmotionVector>>,
}

impl EmotionState {
    pub fn new(vector: EmotionVector) -> Self {
        Self {
            vector: Arc::new(RwLock::new(vector)),
        }
    }

    /// Build from base emotion names, calmed.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(EmotionVector::new(names))
    }

    /// Apply deltas atomically and return the dominant emotions afterwards.
    pub async fn apply<I, S>(&self, deltas: I) -> (Vec<String>, f64)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut vector = self.vector.write().await;
        vector.add_delta(deltas);
        let dominant = vector.dominant();
        tracing::debug!("Emotion update, dominant: {:?} ({:.3})", dominant.0, dominant.1);
        dominant
    }

    pub async fn calm(&self) {
        self.vector.write().await.calm();
    }

    pub async fn dominant(&self) -> (Vec<String>, f64) {
        self.vector.read().await.dominant()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, f64> {
        self.vector.read().await.as_dict()
    }
}
