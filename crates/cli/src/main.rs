//! Rapport CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Talk, and let Rapport learn about you (default)
//! - `profile`  — Show, summarize or clear the stored profile
//! - `onboard`  — Write a default config
//! - `doctor`   — Diagnose setup problems

use std::path::PathBuf;
use clap::{Parser, Subcommand};

mod commands;
mod console;

#[derive(Parser)]
#[command(
    name = "rapport",
    about = "Rapport — a conversation loop that gets to know you",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a conversation
    Chat {
        /// Profile file to read and update
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Inspect or manage the stored profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Write a default configuration file
    Onboard,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print what is known
    Show {
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Compact the profile into one sentence now
    Summarize {
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Delete the profile
    Clear {
        /// Actually delete
        #[arg(long)]
        confirm: bool,

        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Chat { profile: None }) {
        Commands::Chat { profile } => commands::chat::run(profile).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show { profile } => commands::profile::show(profile).await?,
            ProfileAction::Summarize { profile } => commands::profile::summarize(profile).await?,
            ProfileAction::Clear { confirm, profile } => {
                commands::profile::clear(confirm, profile).await?
            }
        },
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
