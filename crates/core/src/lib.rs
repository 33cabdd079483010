//! # Rapport Core
//!
//! Domain types for Rapport, a conversation loop that builds a profile of
//! the person it talks to: messages, the profile and its store trait, the
//! provider trait, the structured-output schemas and the error enums.
//!
//! Everything the loop talks to (model backends, profile stores) is a trait
//! here, implemented in its own crate and mocked in tests.

pub mod error;
pub mod message;
pub mod profile;
pub mod provider;
pub mod schema;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GatewayError, ProviderError, Result, StoreError};
pub use message::{Message, Role};
pub use profile::{Fact, Profile, ProfileStore, line_count};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
pub use schema::{ConversationResponse, ExtractedFact, FactExtraction, StructuredOutput, Summary};
