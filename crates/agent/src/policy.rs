//! Accumulation and summarization policy.
//!
//! New information is appended to the narrative verbatim. Once the
//! narrative grows past a line threshold it is compacted by asking the
//! gateway for a one-sentence summary, which replaces the narrative only
//! when it is non-empty and has strictly fewer lines. A failed or
//! unhelpful summary leaves the narrative untouched, so the line count
//! never goes up.

use std::sync::Arc;
use rapport_config::{PromptSet, render};
use rapport_core::profile::{Profile, line_count};
use rapport_core::schema::Summary;
use tracing::{debug, error, info};
use crate::gateway::StructuredGateway;

/// Append `new_information` to the narrative, separated by a line break.
///
/// Blank input leaves the profile as it was. There is no de-duplication.
pub fn merge(mut profile: Profile, new_information: &str) -> Profile {
    let new_information = new_information.trim();
    if new_information.is_empty() {
        return profile;
    }

    if profile.narrative.is_empty() {
        profile.narrative = new_information.to_string();
    } else {
        profile.narrative.push('\n');
        profile.narrative.push_str(new_information);
    }
    profile.touch();
    profile
}

/// Compacts narratives through the gateway.
pub struct Summarizer {
    gateway: Arc<StructuredGateway>,
    system_prompt: String,
    template: String,
    threshold: usize,
}

impl Summarizer {
    pub fn new(gateway: Arc<StructuredGateway>, prompts: &PromptSet, threshold: usize) -> Self {
        Self {
            gateway,
            system_prompt: prompts.summary_system.clone(),
            template: prompts.summary.clone(),
            threshold,
        }
    }

    /// Line count above which `maybe_summarize` compacts.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether the profile is long enough to be compacted before saving.
    pub fn needs_compaction(&self, profile: &Profile) -> bool {
        profile.line_count() > self.threshold
    }

    /// One-sentence summary of `narrative`, or `narrative` itself when the
    /// summary is unusable. An empty narrative yields `""` without a call.
    pub async fn generate_summary(&self, narrative: &str) -> String {
        if narrative.is_empty() {
            return String::new();
        }

        let prompt = render(&self.template, narrative, "");
        let response = match self
            .gateway
            .request::<Summary>(&self.system_prompt, &prompt, &[])
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Summary generation failed, keeping narrative");
                return narrative.to_string();
            }
        };

        let summary = response.summary.trim();
        if summary.is_empty() {
            debug!("No summary returned");
            return narrative.to_string();
        }

        let (before, after) = (line_count(narrative), line_count(summary));
        if after < before {
            debug!(before, after, summary = %summary, "Generated summary");
            summary.to_string()
        } else {
            debug!(before, after, "Summary was not shorter than narrative");
            narrative.to_string()
        }
    }

    /// Try to compact the narrative regardless of its length.
    ///
    /// Facts rendered into the old narrative are folded into the summary
    /// with it, so an accepted summary also drops them.
    pub async fn summarize(&self, mut profile: Profile) -> Profile {
        let summary = self.generate_summary(&profile.narrative).await;
        if summary != profile.narrative {
            info!(
                before = profile.line_count(),
                after = line_count(&summary),
                folded_facts = profile.facts.len(),
                "Profile compacted"
            );
            profile.narrative = summary;
            profile.facts.clear();
            profile.touch();
        }
        profile
    }

    /// Compact only when the narrative is over the threshold.
    pub async fn maybe_summarize(&self, profile: Profile) -> Profile {
        if !self.needs_compaction(&profile) {
            return profile;
        }
        debug!(
            lines = profile.line_count(),
            threshold = self.threshold,
            "Profile too long, summarizing"
        );
        self.summarize(profile).await
    }
}
