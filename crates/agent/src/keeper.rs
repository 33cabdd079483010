//! Profile persistence with compaction on the way to disk.

use std::sync::Arc;
use rapport_core::error::Result;
use rapport_core::profile::{Profile, ProfileStore};
use tracing::{debug, info};
use crate::policy::Summarizer;

/// Owns the store and applies the summarization policy on every save.
pub struct ProfileKeeper {
    store: Arc<dyn ProfileStore>,
    summarizer: Summarizer,
}

impl ProfileKeeper {
    pub fn new(store: Arc<dyn ProfileStore>, summarizer: Summarizer) -> Self {
        Self { store, summarizer }
    }

    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub async fn load(&self) -> Result<Profile> {
        let profile = self.store.load().await?;
        info!(
            store = %self.store.name(),
            location = %self.store.location(),
            lines = profile.line_count(),
            "Profile loaded"
        );
        Ok(profile)
    }

    /// Compact if over the threshold, then save.
    ///
    /// Returns the profile as written so the caller can keep using it.
    pub async fn persist(&self, profile: Profile) -> Result<Profile> {
        let profile = self.summarizer.maybe_summarize(profile).await;
        self.store.save(&profile).await?;
        debug!(
            location = %self.store.location(),
            lines = profile.line_count(),
            "Profile saved"
        );
        Ok(profile)
    }
}
