//! The conversation driver.
//!
//! One session is: load the profile (compacting it if anything is known),
//! ask an opening question, then loop reading answers. Each answer is
//! mined for new information, merged, and persisted before the next
//! question about a fresh topic is shown. An exit keyword or end of input
//! saves the profile and ends the session.

use std::io;
use std::sync::Arc;
use async_trait::async_trait;
use rapport_config::AppConfig;
use rapport_core::error::Result;
use rapport_core::profile::{Profile, ProfileStore};
use rapport_core::provider::Provider;
use tracing::{debug, info, warn};
use crate::gateway::StructuredGateway;
use crate::interviewer::Interviewer;
use crate::keeper::ProfileKeeper;
use crate::policy::Summarizer;

/// Where questions are shown and answers come from.
#[async_trait]
pub trait Console: Send {
    /// Show `question` and read one line. `None` means end of input.
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    /// Show a message that expects no answer.
    fn say(&mut self, text: &str);
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ExitKeyword,
    EndOfInput,
}

/// The result of [`ConversationDriver::run`].
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Answers that went through extraction
    pub turns: usize,

    /// The profile as last persisted
    pub profile: Profile,

    pub ended_by: SessionEnd,
}

pub struct ConversationDriver {
    keeper: ProfileKeeper,
    interviewer: Interviewer,
    exit_keywords: Vec<String>,
    farewell: String,
}

impl ConversationDriver {
    pub fn new(
        keeper: ProfileKeeper,
        interviewer: Interviewer,
        exit_keywords: Vec<String>,
        farewell: impl Into<String>,
    ) -> Self {
        Self {
            keeper,
            interviewer,
            exit_keywords: exit_keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            farewell: farewell.into(),
        }
    }

    /// Wire up a driver from configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        let gateway = Arc::new(
            StructuredGateway::new(provider, model)
                .with_temperature(config.default_temperature)
                .with_max_tokens(config.default_max_tokens),
        );
        let summarizer = Summarizer::new(
            gateway.clone(),
            &config.prompts,
            config.profile.summarize_threshold,
        );

        Self::new(
            ProfileKeeper::new(store, summarizer),
            Interviewer::new(gateway, config),
            config.conversation.exit_keywords.clone(),
            config.conversation.farewell.clone(),
        )
    }

    pub fn keeper(&self) -> &ProfileKeeper {
        &self.keeper
    }

    /// Whether `input` ends the session (trimmed, case-insensitive).
    pub fn is_exit(&self, input: &str) -> bool {
        let input = input.trim().to_lowercase();
        self.exit_keywords.iter().any(|k| *k == input)
    }

    /// Load and compact the profile, then pick the opening question.
    pub async fn start(&self) -> Result<(Profile, String)> {
        let mut profile = self.keeper.load().await?;

        if !profile.is_empty() {
            debug!("Compacting loaded profile");
            profile = self.keeper.summarizer().summarize(profile).await;
            profile = self.keeper.persist(profile).await?;
        }

        let question = self.interviewer.initial_question(&profile).await;
        Ok((profile, question))
    }

    /// Process one answer. Returns the updated profile and the next question.
    pub async fn turn(&self, profile: Profile, answer: &str) -> Result<(Profile, String)> {
        let extraction = match self.interviewer.extract(answer, &profile).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(error = %e, "Could not process answer, keeping profile");
                return Ok((profile, self.interviewer.fallback_question().to_string()));
            }
        };

        if extraction.is_empty() {
            debug!("Nothing new learned this turn");
        }
        let profile = extraction.apply_to(profile);

        let question = self.interviewer.new_topic_question(&profile).await;
        let profile = self.keeper.persist(profile).await?;
        Ok((profile, question))
    }

    /// Run a session until an exit keyword or end of input.
    pub async fn run(&self, console: &mut dyn Console) -> Result<SessionOutcome> {
        let (mut profile, mut question) = self.start().await?;
        let mut turns = 0;

        info!(
            known_lines = profile.line_count(),
            mode = ?self.interviewer.mode(),
            "Session started"
        );

        let ended_by = loop {
            let Some(line) = console.ask(&question).await? else {
                break SessionEnd::EndOfInput;
            };

            let answer = line.trim();
            if answer.is_empty() {
                continue;
            }
            if self.is_exit(answer) {
                break SessionEnd::ExitKeyword;
            }

            (profile, question) = self.turn(profile, answer).await?;
            turns += 1;
        };

        console.say(&self.farewell);
        let profile = self.keeper.persist(profile).await?;

        info!(turns, ?ended_by, lines = profile.line_count(), "Session ended");
        Ok(SessionOutcome {
            turns,
            profile,
            ended_by,
        })
    }
}
