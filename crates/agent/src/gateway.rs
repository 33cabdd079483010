//! Structured-response gateway.
//!
//! Turns (system prompt, user prompt, schema, images) into a typed value by
//! asking the provider for a `json_schema`-constrained completion. Every
//! outcome that isn't a parsed value comes back as a [`GatewayError`].

use std::sync::Arc;
use rapport_core::error::GatewayError;
use rapport_core::message::Message;
use rapport_core::provider::{Provider, ProviderRequest, ResponseFormat};
use rapport_core::schema::StructuredOutput;
use tracing::{debug, warn};

/// Typed front end over a [`Provider`].
pub struct StructuredGateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl StructuredGateway {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask for a value of type `T`.
    pub async fn request<T: StructuredOutput>(
        &self,
        system_prompt: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<T, GatewayError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(system_prompt),
                Message::user(prompt).with_images(images.iter().cloned()),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: Some(ResponseFormat {
                name: T::NAME.into(),
                schema: T::json_schema(),
                strict: true,
            }),
        };

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            schema = T::NAME,
            images = images.len(),
            "Structured request"
        );

        let response = self.provider.complete(request).await?;

        if let Some(refusal) = response.refusal {
            warn!(schema = T::NAME, refusal = %refusal, "Model refused structured request");
            return Err(GatewayError::Refusal(refusal));
        }

        if let Some(usage) = &response.usage {
            debug!(
                schema = T::NAME,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Structured response received"
            );
        }

        parse_structured(&response.message.content)
    }
}

/// Parse a reply body into `T`, tolerating Markdown code fences.
pub fn parse_structured<T: StructuredOutput>(content: &str) -> Result<T, GatewayError> {
    let json = extract_json(content).ok_or_else(|| GatewayError::Empty {
        schema: T::NAME.into(),
    })?;

    serde_json::from_str(json).map_err(|e| GatewayError::Malformed {
        schema: T::NAME.into(),
        reason: e.to_string(),
    })
}

/// Locate the JSON object in a reply that may be wrapped in ``` fences.
fn extract_json(text: &str) -> Option<&str> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Some(start) = cleaned.find("```json") {
        let after_fence = &cleaned[start + 7..];
        let body = match after_fence.find("```") {
            Some(end) => &after_fence[..end],
            None => after_fence,
        };
        return Some(body.trim());
    }

    if let Some(start) = cleaned.find("```") {
        let after_fence = &cleaned[start + 3..];
        let body = match after_fence.find("```") {
            Some(end) => &after_fence[..end],
            None => after_fence,
        };
        return Some(body.trim());
    }

    if cleaned.starts_with('{') {
        return Some(cleaned);
    }

    // Prose around the object: take the outermost braces.
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&cleaned[start..=end]),
        _ => Some(cleaned),
    }
}
