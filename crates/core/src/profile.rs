//! Profile — accumulated knowledge about the conversation partner.
//!
//! The narrative is free text that only grows, one appended block per
//! turn, until a summarization pass replaces it with something strictly
//! shorter. Stores persist it between runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::StoreError;

/// Number of lines in a piece of text. An empty string has zero lines.
pub fn line_count(text: &str) -> usize {
    text.lines().count()
}

/// A structured fact learned about the person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// What the fact is about (e.g., "hobbies", "work")
    pub topic: String,

    /// The fact itself
    pub fact: String,

    /// Extraction confidence in [0, 1]
    pub confidence: f32,

    /// When the fact was learned
    pub learned_at: DateTime<Utc>,
}

impl Fact {
    /// Render as a single narrative line.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.topic.trim(), self.fact.trim())
    }
}

/// The running profile of one person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Free-text narrative, append-ordered
    #[serde(default)]
    pub narrative: String,

    /// When the narrative last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    /// Structured facts since the last accepted summary (only persisted by
    /// stores that support them)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<Fact>,
}

impl Profile {
    /// An empty profile, as on first run.
    pub fn new() -> Self {
        Self::default()
    }

    /// A profile holding the given narrative.
    pub fn from_narrative(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            ..Self::default()
        }
    }

    /// Whether nothing is known yet.
    pub fn is_empty(&self) -> bool {
        self.narrative.trim().is_empty()
    }

    /// Number of narrative lines.
    pub fn line_count(&self) -> usize {
        line_count(&self.narrative)
    }

    /// Mark the profile as changed now.
    pub fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

/// Persistence for a single profile.
///
/// Each store is bound to one location at construction. Concurrent use of
/// the same location from several processes is not supported.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The store kind (e.g., "text", "json", "memory").
    fn name(&self) -> &str;

    /// Human-readable location (a path for file stores).
    fn location(&self) -> String;

    /// Load the profile. A missing file yields an empty profile.
    async fn load(&self) -> std::result::Result<Profile, StoreError>;

    /// Overwrite the persisted profile.
    async fn save(&self, profile: &Profile) -> std::result::Result<(), StoreError>;

    /// Delete the persisted profile. Returns whether anything was removed.
    async fn clear(&self) -> std::result::Result<bool, StoreError>;
}
