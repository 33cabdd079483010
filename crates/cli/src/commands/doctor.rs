//! `rapport doctor` — Diagnose setup problems.

use rapport_config::AppConfig;
use rapport_providers::build_from_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Rapport Doctor");
    println!("=================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `rapport onboard` to create one)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ❌ No API key: set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match build_from_config(&config) {
        Ok(provider) => {
            if provider.health_check().await.unwrap_or(false) {
                println!("  ✅ Provider '{}' reachable", provider.name());
            } else {
                println!("  ❌ Provider '{}' not reachable", provider.name());
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Provider '{}': {e}", config.default_provider);
            issues += 1;
        }
    }

    let store = rapport_store::open(&config.profile);
    match store.load().await {
        Ok(profile) if profile.is_empty() => {
            println!("  ✅ Profile {} (empty)", store.location());
        }
        Ok(profile) => {
            println!(
                "  ✅ Profile {} ({} lines)",
                store.location(),
                profile.line_count()
            );
        }
        Err(e) => {
            println!("  ❌ Profile unreadable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
