//! Profile persistence backends for Rapport.

pub mod in_memory;
pub mod json_file;
pub mod text_file;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
pub use text_file::TextFileStore;

use rapport_config::{ProfileConfig, ProfileFormat};
use rapport_core::error::StoreError;
use rapport_core::profile::ProfileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Open the store described by the `[profile]` config section.
pub fn open(config: &ProfileConfig) -> Arc<dyn ProfileStore> {
    open_path(config.path(), config.resolved_format())
}

/// Open a file store at `path`. `Auto` picks JSON for `*.json` paths.
pub fn open_path(path: impl Into<PathBuf>, format: ProfileFormat) -> Arc<dyn ProfileStore> {
    let path = path.into();
    let format = format.resolve(&path);

    tracing::debug!(path = %path.display(), ?format, "Opening profile store");
    match format {
        ProfileFormat::Json => Arc::new(JsonFileStore::new(path)),
        ProfileFormat::Text | ProfileFormat::Auto => Arc::new(TextFileStore::new(path)),
    }
}

/// Create the parent directory of `path` if it has one.
pub(crate) async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e)),
        _ => Ok(()),
    }
}

pub(crate) fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
