pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod profile;

use std::path::PathBuf;
use rapport_config::AppConfig;

/// Load config, letting `--profile` win over file and environment.
pub(crate) fn load_config(profile: Option<PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(path) = profile {
        config.profile.path = path.to_string_lossy().into_owned();
    }
    Ok(config)
}

/// Print setup help and fail when no provider credentials are available.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || config.default_provider == "ollama" {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    OPENAI_API_KEY=sk-...          (OpenAI, the default provider)");
    eprintln!("    OPENROUTER_API_KEY=sk-or-...   (with RAPPORT_PROVIDER=openrouter)");
    eprintln!("    RAPPORT_API_KEY=...            (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
