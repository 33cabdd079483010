//! JSON profile store — a single versioned document.
//!
//! ```json
//! {
//!   "version": 1,
//!   "narrative": "Works as a nurse\nHas two cats",
//!   "last_updated": "2026-10-19T09:30:00Z",
//!   "facts": [{"topic": "pets", "fact": "Has two cats", "confidence": 0.9, "learned_at": "..."}]
//! }
//! ```
//!
//! Documents without `version` (the older `{narrative, last_updated}` shape)
//! are read as version 1. Unreadable documents are reported, never replaced.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rapport_core::error::StoreError;
use rapport_core::profile::{Fact, Profile, ProfileStore};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::{ensure_parent, io_error};

/// Newest document version this store reads and the one it writes.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default = "legacy_version")]
    version: u32,

    #[serde(default)]
    narrative: String,

    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    facts: Vec<Fact>,
}

fn legacy_version() -> u32 {
    1
}

/// A profile stored as a JSON document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store bound to the given path. Nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Profile, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No profile file yet, starting empty");
                return Ok(Profile::new());
            }
            Err(e) => return Err(io_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Profile::new());
        }

        let doc: ProfileDocument =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if doc.version > CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                found: doc.version,
                supported: CURRENT_VERSION,
            });
        }

        let profile = Profile {
            narrative: doc.narrative.trim().to_string(),
            last_updated: doc.last_updated,
            facts: doc.facts,
        };
        debug!(
            path = %self.path.display(),
            lines = profile.line_count(),
            facts = profile.facts.len(),
            "Profile loaded"
        );
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let doc = ProfileDocument {
            version: CURRENT_VERSION,
            narrative: profile.narrative.clone(),
            last_updated: profile.last_updated,
            facts: profile.facts.clone(),
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: format!("Failed to serialize profile: {e}"),
        })?;

        ensure_parent(&self.path).await?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        debug!(path = %self.path.display(), lines = profile.line_count(), "Profile saved");
        Ok(())
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }
}
