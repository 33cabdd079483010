//! LLM backends for Rapport.
//!
//! Every backend is reached through [`OpenAiCompatProvider`];
//! [`build_from_config`] picks the endpoint, key and model.

pub mod endpoint;
pub mod openai_compat;

pub use endpoint::{build_from_config, endpoint_for, model_for};
pub use openai_compat::OpenAiCompatProvider;
