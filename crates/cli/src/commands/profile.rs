//! `rapport profile` — Inspect and manage the stored profile.

use std::path::PathBuf;
use std::sync::Arc;
use rapport_agent::{StructuredGateway, Summarizer};
use rapport_providers::{build_from_config, model_for};

pub async fn show(profile: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(profile)?;
    let store = rapport_store::open(&config.profile);
    let profile = store.load().await?;

    println!("Profile: {} ({})", store.location(), store.name());
    if profile.is_empty() {
        println!("  Nothing known yet. Run `rapport chat` to start.");
        return Ok(());
    }

    println!("  Lines:    {}", profile.line_count());
    if let Some(updated) = profile.last_updated {
        println!("  Updated:  {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    println!();
    for line in profile.narrative.lines() {
        println!("  {line}");
    }

    if !profile.facts.is_empty() {
        println!();
        println!("  Facts:");
        for fact in &profile.facts {
            println!("    [{:.2}] {}", fact.confidence, fact.to_line());
        }
    }

    Ok(())
}

pub async fn summarize(profile: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(profile)?;
    super::require_api_key(&config)?;

    let store = rapport_store::open(&config.profile);
    let profile = store.load().await?;
    if profile.is_empty() {
        println!("Nothing to summarize.");
        return Ok(());
    }

    let provider = build_from_config(&config)?;
    let gateway = Arc::new(
        StructuredGateway::new(provider, model_for(&config, &config.default_provider))
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens),
    );
    let summarizer = Summarizer::new(gateway, &config.prompts, config.profile.summarize_threshold);

    let before = profile.line_count();
    let profile = summarizer.summarize(profile).await;
    store.save(&profile).await?;

    if profile.line_count() < before {
        println!("Compacted {before} lines into {}:", profile.line_count());
        println!("  {}", profile.narrative);
    } else {
        println!("Profile kept as is ({before} lines); no shorter summary was produced.");
    }

    Ok(())
}

pub async fn clear(confirm: bool, profile: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(profile)?;
    let store = rapport_store::open(&config.profile);

    if !confirm {
        println!("This will delete the profile at {} permanently.", store.location());
        println!("   Run with --confirm to proceed:");
        println!("   rapport profile clear --confirm");
        return Ok(());
    }

    if store.clear().await? {
        println!("Deleted {}", store.location());
    } else {
        println!("No profile at {}", store.location());
    }

    Ok(())
}
