//! Resolve the configured backend into a ready [`OpenAiCompatProvider`].
//!
//! Every backend Rapport talks to speaks `/v1/chat/completions`, so the
//! only per-backend differences are the endpoint root, the key and the
//! model. Names without a built-in endpoint must set `api_url`.

use std::sync::Arc;
use rapport_config::AppConfig;
use rapport_core::error::ProviderError;
use rapport_core::provider::Provider;
use tracing::{debug, warn};
use crate::openai_compat::OpenAiCompatProvider;

/// Backends whose endpoint is known without configuration.
const KNOWN_ENDPOINTS: &[(&str, &str)] = &[
    ("openai", "https://api.openai.com/v1"),
    ("openrouter", "https://openrouter.ai/api/v1"),
    ("ollama", "http://localhost:11434/v1"),
];

/// Endpoint root for `name`: its `api_url`, else the built-in one.
pub fn endpoint_for(config: &AppConfig, name: &str) -> Option<String> {
    config
        .providers
        .get(name)
        .and_then(|p| p.api_url.clone())
        .or_else(|| known_endpoint(name).map(String::from))
}

fn known_endpoint(name: &str) -> Option<&'static str> {
    KNOWN_ENDPOINTS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, url)| *url)
}

/// The model to use for a backend: its own override, else the global default.
pub fn model_for(config: &AppConfig, name: &str) -> String {
    config
        .providers
        .get(name)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Build the `default_provider` backend.
///
/// Fails with [`ProviderError::NotConfigured`] when the name has neither a
/// built-in endpoint nor an `api_url`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.default_provider.as_str();
    let Some(base_url) = endpoint_for(config, name) else {
        warn!(provider = %name, "No endpoint for provider");
        return Err(ProviderError::NotConfigured(format!(
            "no endpoint known for '{name}'; set [providers.{name}] api_url in config.toml"
        )));
    };

    let api_key = config
        .providers
        .get(name)
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    debug!(provider = %name, base_url = %base_url, "Using provider");
    Ok(Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)))
}
