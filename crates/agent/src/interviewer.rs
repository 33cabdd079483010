//! Question generation and per-turn extraction.

use std::sync::Arc;
use chrono::Utc;
use rapport_config::{AppConfig, ExtractionMode, PromptSet, render};
use rapport_core::error::GatewayError;
use rapport_core::profile::{Fact, Profile};
use rapport_core::schema::{ConversationResponse, FactExtraction};
use tracing::{debug, warn};
use crate::gateway::StructuredGateway;
use crate::policy::merge;

/// What one answer taught us.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Narrative text to append (may be empty)
    pub new_information: String,

    /// Structured facts kept in facts mode
    pub facts: Vec<Fact>,
}

impl Extraction {
    /// Merge into `profile`, recording facts alongside the narrative.
    pub fn apply_to(self, profile: Profile) -> Profile {
        let mut profile = merge(profile, &self.new_information);
        profile.facts.extend(self.facts);
        profile
    }

    pub fn is_empty(&self) -> bool {
        self.new_information.trim().is_empty() && self.facts.is_empty()
    }
}

/// Asks the questions and reads the answers.
pub struct Interviewer {
    gateway: Arc<StructuredGateway>,
    prompts: PromptSet,
    mode: ExtractionMode,
    min_confidence: f32,
    fallback_question: String,
}

impl Interviewer {
    pub fn new(gateway: Arc<StructuredGateway>, config: &AppConfig) -> Self {
        Self {
            gateway,
            prompts: config.prompts.clone(),
            mode: config.conversation.extraction,
            min_confidence: config.conversation.min_confidence,
            fallback_question: config.conversation.fallback_question.clone(),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn fallback_question(&self) -> &str {
        &self.fallback_question
    }

    /// Opening question: contextual for a known person, the fallback otherwise.
    pub async fn initial_question(&self, profile: &Profile) -> String {
        if profile.is_empty() {
            return self.fallback_question.clone();
        }

        let prompt = render(&self.prompts.initial_question, &profile.narrative, "");
        self.ask_for_question(&prompt, "opening").await
    }

    /// A question about a topic the profile doesn't cover yet.
    pub async fn new_topic_question(&self, profile: &Profile) -> String {
        let mut prompt = self.prompts.new_topic.clone();
        if !profile.is_empty() {
            prompt.push_str(&render(
                &self.prompts.new_topic_with_profile,
                &profile.narrative,
                "",
            ));
        }
        self.ask_for_question(&prompt, "new topic").await
    }

    async fn ask_for_question(&self, prompt: &str, kind: &str) -> String {
        match self
            .gateway
            .request::<ConversationResponse>(&self.prompts.system, prompt, &[])
            .await
        {
            Ok(response) if !response.question.trim().is_empty() => {
                response.question.trim().to_string()
            }
            Ok(_) => {
                warn!(kind, "Model returned an empty question, using fallback");
                self.fallback_question.clone()
            }
            Err(e) => {
                warn!(kind, error = %e, "Question generation failed, using fallback");
                self.fallback_question.clone()
            }
        }
    }

    /// Pull whatever is new out of `answer`.
    pub async fn extract(&self, answer: &str, profile: &Profile) -> Result<Extraction, GatewayError> {
        match self.mode {
            ExtractionMode::Narrative => {
                let prompt = render(&self.prompts.process_response, &profile.narrative, answer);
                let response: ConversationResponse = self
                    .gateway
                    .request(&self.prompts.system, &prompt, &[])
                    .await?;
                debug!(new_information = %response.new_information, "Extracted narrative");
                Ok(Extraction {
                    new_information: response.new_information.trim().to_string(),
                    facts: Vec::new(),
                })
            }
            ExtractionMode::Facts => {
                let prompt = render(&self.prompts.facts_extraction, &profile.narrative, answer);
                let response: FactExtraction = self
                    .gateway
                    .request(&self.prompts.system, &prompt, &[])
                    .await?;
                Ok(self.keep_confident(response))
            }
        }
    }

    fn keep_confident(&self, response: FactExtraction) -> Extraction {
        let proposed = response.extracted_facts.len();
        let learned_at = Utc::now();
        let facts: Vec<Fact> = response
            .extracted_facts
            .into_iter()
            .filter(|f| f.confidence >= self.min_confidence && !f.fact.trim().is_empty())
            .map(|f| Fact {
                topic: f.topic,
                fact: f.fact,
                confidence: f.confidence,
                learned_at,
            })
            .collect();

        debug!(
            proposed,
            kept = facts.len(),
            reasoning = %response.reasoning,
            "Extracted facts"
        );

        let new_information = facts
            .iter()
            .map(Fact::to_line)
            .collect::<Vec<_>>()
            .join("\n");

        Extraction {
            new_information,
            facts,
        }
    }
}
