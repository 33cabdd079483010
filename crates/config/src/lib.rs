//! Configuration loading, validation, and management for Rapport.
//!
//! Loads configuration from `~/.rapport/config.toml` with environment
//! variable overrides. Validates all settings at startup.

pub mod prompts;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use prompts::{PromptSet, render};

/// The root configuration structure.
///
/// Maps directly to `~/.rapport/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Where and how the profile is persisted
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Conversation loop behaviour
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptSet,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("profile", &self.profile)
            .field("conversation", &self.conversation)
            .field("prompts", &self.prompts)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// On-disk format of the profile file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileFormat {
    /// JSON for `*.json` paths, plain text otherwise
    #[default]
    Auto,
    /// Whole file is the narrative
    Text,
    /// Versioned JSON document
    Json,
}

impl ProfileFormat {
    /// Resolve `Auto` against the file extension; explicit formats pass through.
    pub fn resolve(self, path: &Path) -> ProfileFormat {
        match self {
            ProfileFormat::Auto => {
                let is_json = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                if is_json {
                    ProfileFormat::Json
                } else {
                    ProfileFormat::Text
                }
            }
            explicit => explicit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_path")]
    pub path: String,

    #[serde(default)]
    pub format: ProfileFormat,

    /// Narratives with more lines than this are summarized before saving
    #[serde(default = "default_summarize_threshold")]
    pub summarize_threshold: usize,
}

fn default_profile_path() -> String {
    "profile.txt".into()
}
fn default_summarize_threshold() -> usize {
    5
}

impl ProfileConfig {
    /// The profile path as a `PathBuf`.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// The configured format with `Auto` resolved against the path.
    pub fn resolved_format(&self) -> ProfileFormat {
        self.format.resolve(Path::new(&self.path))
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: default_profile_path(),
            format: ProfileFormat::Auto,
            summarize_threshold: default_summarize_threshold(),
        }
    }
}

/// How each answer is turned into profile updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Free-text `new_information`
    #[default]
    Narrative,
    /// Structured facts with confidence scores
    Facts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Inputs that end the session (case-insensitive)
    #[serde(default = "default_exit_keywords")]
    pub exit_keywords: Vec<String>,

    /// Asked when there is no profile yet or the gateway fails
    #[serde(default = "default_fallback_question")]
    pub fallback_question: String,

    /// Printed when the person leaves
    #[serde(default = "default_farewell")]
    pub farewell: String,

    #[serde(default)]
    pub extraction: ExtractionMode,

    /// Facts below this confidence are dropped (facts mode)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_exit_keywords() -> Vec<String> {
    vec!["quit".into(), "exit".into(), "bye".into()]
}
fn default_fallback_question() -> String {
    "Hi! Tell me something about yourself?".into()
}
fn default_farewell() -> String {
    "Thank you for sharing with me! I've learned a lot about you.".into()
}
fn default_min_confidence() -> f32 {
    0.5
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            exit_keywords: default_exit_keywords(),
            fallback_question: default_fallback_question(),
            farewell: default_farewell(),
            extraction: ExtractionMode::Narrative,
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.rapport/config.toml).
    ///
    /// A `.env` file in the working directory is read first. Then
    /// environment variables are checked:
    /// - `RAPPORT_API_KEY` (highest priority), `OPENAI_API_KEY`, `OPENROUTER_API_KEY`
    /// - `RAPPORT_PROVIDER`, `RAPPORT_MODEL`, `RAPPORT_PROFILE`
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("RAPPORT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("RAPPORT_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("RAPPORT_MODEL") {
            config.default_model = model;
        }

        if let Ok(path) = std::env::var("RAPPORT_PROFILE") {
            config.profile.path = path;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rapport")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.profile.summarize_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "profile.summarize_threshold must be at least 1".into(),
            ));
        }

        if self.profile.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "profile.path must not be empty".into(),
            ));
        }

        let confidence = self.conversation.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::ValidationError(
                "conversation.min_confidence must be between 0.0 and 1.0".into(),
            ));
        }

        if self.conversation.exit_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "conversation.exit_keywords needs at least one keyword".into(),
            ));
        }

        if self.conversation.fallback_question.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "conversation.fallback_question must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            profile: ProfileConfig::default(),
            conversation: ConversationConfig::default(),
            prompts: PromptSet::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.profile.summarize_threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.prompts, config.prompts);
        assert_eq!(parsed.conversation.exit_keywords, config.conversation.exit_keywords);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_threshold_rejected() {
        let mut config = AppConfig::default();
        config.profile.summarize_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_confidence_rejected() {
        let mut config = AppConfig::default();
        config.conversation.min_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn load_from_file_applies_sections() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
default_model = "gpt-4o"

[profile]
path = "people/ada.json"
summarize_threshold = 8

[conversation]
exit_keywords = ["stop"]
extraction = "facts"
min_confidence = 0.7

[prompts]
system = "Be kind."
"#
        )
        .unwrap();

        let config = AppConfig::load_from(tmp.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.profile.summarize_threshold, 8);
        assert_eq!(config.profile.resolved_format(), ProfileFormat::Json);
        assert_eq!(config.conversation.exit_keywords, vec!["stop"]);
        assert_eq!(config.conversation.extraction, ExtractionMode::Facts);
        assert_eq!(config.prompts.system, "Be kind.");
        assert_eq!(config.conversation.fallback_question, default_fallback_question());
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "default_model = [unclosed").unwrap();
        let err = AppConfig::load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn auto_format_follows_extension() {
        let mut profile = ProfileConfig::default();
        assert_eq!(profile.resolved_format(), ProfileFormat::Text);

        profile.path = "profile.JSON".into();
        assert_eq!(profile.resolved_format(), ProfileFormat::Json);

        profile.format = ProfileFormat::Text;
        assert_eq!(profile.resolved_format(), ProfileFormat::Text);
    }

    #[test]
    fn debug_redacts_api_keys() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("profile.txt"));
    }
}
