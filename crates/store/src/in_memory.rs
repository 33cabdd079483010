//! In-memory store — useful for testing and throwaway sessions.

use async_trait::async_trait;
use rapport_core::error::StoreError;
use rapport_core::profile::{Profile, ProfileStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A store that keeps the profile in memory and counts saves.
pub struct InMemoryStore {
    profile: Arc<RwLock<Option<Profile>>>,
    saves: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            profile: Arc::new(RwLock::new(None)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Start with an already-persisted profile.
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile: Arc::new(RwLock::new(Some(profile))),
            saves: AtomicUsize::new(0),
        }
    }

    /// The currently persisted profile, if any.
    pub async fn snapshot(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn location(&self) -> String {
        "(in memory)".into()
    }

    async fn load(&self) -> Result<Profile, StoreError> {
        Ok(self.profile.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        *self.profile.write().await = Some(profile.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        Ok(self.profile.write().await.take().is_some())
    }
}
