//! `rapport chat` — The interactive conversation.

use std::path::PathBuf;
use rapport_agent::{ConversationDriver, SessionEnd};
use rapport_providers::{build_from_config, model_for};
use crate::console::StdConsole;

pub async fn run(profile: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(profile)?;
    let provider = build_from_config(&config)?;
    super::require_api_key(&config)?;

    let model = model_for(&config, &config.default_provider);
    let store = rapport_store::open(&config.profile);

    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {model}");
    println!("  Profile:   {}", store.location());
    println!();
    println!(
        "  Answer the questions. Type {} to leave.",
        config.conversation.exit_keywords.join(", ")
    );

    let driver = ConversationDriver::from_config(&config, provider, model, store);
    let mut console = StdConsole::new();
    let outcome = driver.run(&mut console).await?;

    if outcome.ended_by == SessionEnd::EndOfInput {
        println!();
    }
    tracing::info!(
        turns = outcome.turns,
        lines = outcome.profile.line_count(),
        "Conversation finished"
    );

    Ok(())
}
