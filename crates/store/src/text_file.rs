//! Plain-text profile store — the whole file is the narrative.
//!
//! Storage location defaults to `profile.txt` in the working directory.
//! Facts are not persisted by this store; their rendered lines already
//! live in the narrative.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rapport_core::error::StoreError;
use rapport_core::profile::{Profile, ProfileStore};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::{ensure_parent, io_error};

/// A profile stored as a single text file.
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    /// Create a store bound to the given path. Nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProfileStore for TextFileStore {
    fn name(&self) -> &str {
        "text"
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

        // The file carries no timestamp of its own; use its mtime.
        let last_updated = tokio::fs::metadata(&self.path)
            .await
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        let profile = Profile {
            narrative: content.trim().to_string(),
            last_updated,
            facts: Vec::new(),
        };
        debug!(path = %self.path.display(), lines = profile.line_count(), "Profile loaded");
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        ensure_parent(&self.path).await?;
        tokio::fs::write(&self.path, profile.narrative.as_bytes())
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
