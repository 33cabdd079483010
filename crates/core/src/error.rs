//! Error types for the Rapport domain.
//!
//! Uses `thiserror`. Each bounded context has its own enum; [`Error`] only
//! carries what can end a session.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a session.
///
/// Gateway and provider failures never get here: the conversation loop
/// recovers from them. Only persistence and terminal I/O are fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Transport-level failures talking to an LLM backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Outcome of a schema-constrained request that did not yield a value.
///
/// `Refusal` is the model explicitly declining; every other variant is a
/// gateway failure (transport or parse).
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Model refused the request: {0}")]
    Refusal(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Response did not match schema '{schema}': {reason}")]
    Malformed { schema: String, reason: String },

    #[error("Empty response for schema '{schema}'")]
    Empty { schema: String },
}

impl GatewayError {
    /// Whether the model refused, as opposed to the call failing.
    pub fn is_refusal(&self) -> bool {
        matches!(self, GatewayError::Refusal(_))
    }
}

/// Failures reading or writing a persisted profile.
///
/// A missing file is not an error: stores return an empty profile instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Profile at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Profile at {path} has version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}
