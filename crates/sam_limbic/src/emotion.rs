//! Discrete emotion vector.
//!
//! Each base emotion carries a weight. The weights always form a distribution:
//! every mutation clamps negatives to 0 and renormalizes, so readers can treat
//! a snapshot as probabilities without further work.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default set of base emotions.
pub const BASE_EMOTIONS: [&str; 6] = [
    "Anger",
    "Disgust",
    "Fear",
    "Happiness",
    "Sadness",
    "Surprise",
];

/// Canonical form of an emotion name: first character upper case, rest lower case.
pub fn canonical_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// A single named weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    pub name: String,
    pub value: f64,
}

impl Emotion {
    fn new(name: &str) -> Self {
        Self {
            name: canonical_name(name),
            value: 0.0,
        }
    }
}

/// Fixed set of emotions whose values sum to 1.
///
/// Iteration order is the construction order. The key set never changes
/// after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    emotions: Vec<Emotion>,
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self::new(BASE_EMOTIONS)
    }
}

impl EmotionVector {
    /// Build a vector with one emotion per distinct canonical name, calmed
    /// to the uniform distribution.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut emotions: Vec<Emotion> = Vec::new();
        for name in names {
            let emotion = Emotion::new(name.as_ref());
            if emotion.name.is_empty() || emotions.iter().any(|e| e.name == emotion.name) {
                continue;
            }
            emotions.push(emotion);
        }

        let mut vector = Self { emotions };
        vector.calm();
        vector
    }

    pub fn len(&self) -> usize {
        self.emotions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emotion> {
        self.emotions.iter()
    }

    /// Current weight of an emotion, if it is part of the vector.
    pub fn get(&self, name: &str) -> Option<f64> {
        let name = canonical_name(name);
        self.emotions.iter().find(|e| e.name == name).map(|e| e.value)
    }

    /// Reset every emotion to the same weight.
    pub fn calm(&mut self) {
        if self.emotions.is_empty() {
            return;
        }
        let base = 1.0 / self.emotions.len() as f64;
        for emotion in &mut self.emotions {
            emotion.value = base;
        }
        self.normalize();
    }

    /// Scale the weights so they sum to 1; an all-zero vector becomes uniform.
    ///
    /// A sum too large to represent is handled by dividing through by the
    /// largest weight before normalizing.
    pub fn normalize(&mut self) {
        if self.emotions.is_empty() {
            return;
        }
        let mut total: f64 = self.emotions.iter().map(|e| e.value).sum();
        if !total.is_finite() {
            // Large weights overflow the sum; bring them to [0, 1] first
            let max = self.emotions.iter().map(|e| e.value).fold(0.0, f64::max);
            if max.is_finite() && max > 0.0 {
                for emotion in &mut self.emotions {
                    emotion.value /= max;
                }
                total = self.emotions.iter().map(|e| e.value).sum();
            }
        }
        if !total.is_finite() || total == 0.0 {
            let uniform = 1.0 / self.emotions.len() as f64;
            for emotion in &mut self.emotions {
                emotion.value = uniform;
            }
        } else {
            for emotion in &mut self.emotions {
                emotion.value /= total;
            }
        }
    }

    /// Add deltas to known emotions, clamp at 0, then renormalize.
    ///
    /// Names are matched after canonicalization, so `"happiness"` hits
    /// `Happiness`. Unknown names and non-finite deltas are skipped, and a
    /// weight never grows past `f64::MAX`.
    ///
    /// ```
    /// use sam_limbic::EmotionVector;
    ///
    /// let mut v = EmotionVector::default();
    /// v.add_delta([("Happiness", 0.3), ("Surprise", 0.1)]);
    /// let (dominant, _) = v.dominant();
    /// assert_eq!(dominant, vec!["Happiness".to_string()]);
    /// ```
    pub fn add_delta<I, S>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        for (name, delta) in deltas {
            let name = canonical_name(name.as_ref());
            if !delta.is_finite() {
                tracing::debug!("Skipping non-finite delta {} for {}", delta, name);
                continue;
            }
            match self.emotions.iter_mut().find(|e| e.name == name) {
                Some(emotion) => {
                    // Weights saturate at f64::MAX rather than overflow
                    emotion.value = (emotion.value + delta).clamp(0.0, f64::MAX);
                }
                None => tracing::trace!("Ignoring delta for unknown emotion {}", name),
            }
        }
        self.normalize();
    }

    /// Every emotion tied at the maximum weight, and that weight.
    pub fn dominant(&self) -> (Vec<String>, f64) {
        let max = self
            .emotions
            .iter()
            .map(|e| e.value)
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return (Vec::new(), 0.0);
        }
        let names = self
            .emotions
            .iter()
            .filter(|e| e.value == max)
            .map(|e| e.name.clone())
            .collect();
        (names, max)
    }

    /// Snapshot of the current weights.
    pub fn as_dict(&self) -> BTreeMap<String, f64> {
        self.emotions
            .iter()
            .map(|e| (e.name.clone(), e.value))
            .collect()
    }
}
