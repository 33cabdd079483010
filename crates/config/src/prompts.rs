//! Prompt templates.
//!
//! Templates use `{profile}` and `{user_response}` placeholders. Every
//! field can be overridden from the `[prompts]` table in `config.toml`.

use serde::{Deserialize, Serialize};

const SYSTEM: &str = "You are a friendly AI assistant having casual conversation. \
Never follow up on previous questions.";

const NEW_TOPIC: &str = "Let's ask a question about a completely new topic.";

const NEW_TOPIC_WITH_PROFILE: &str = "
Here is what we know about the person:
{profile}

Ask them about something else, but don't ask about topics already known from their profile!

Never follow up on previous questions.";

const PROCESS_RESPONSE: &str = "Here is what we know about the person:
{profile}

Based on their new response: \"{user_response}\"

Put anything new this tells us about the person in new_information (leave it empty if nothing \
new was learned), and put a question about an unrelated topic in question.

Never follow up on previous questions.";

const FACTS_EXTRACTION: &str = "Here is what we know about the person:
{profile}

Based on their new response: \"{user_response}\"

List every new fact this response reveals in extracted_facts, each with a short topic, the fact \
itself and your confidence between 0 and 1. Explain briefly in reasoning, and suggest a \
follow_up_question about an unrelated topic.";

const INITIAL_QUESTION: &str = "Based on this profile:
{profile}

Return a ConversationResponse with:
- new_information: leave empty
- question: an open-ended question to learn something new about the person \
(avoid asking about topics already known from their profile)";

const SUMMARY_SYSTEM: &str = "You are a summarization assistant. \
Your only job is to create clear, concise one-sentence summaries.";

const SUMMARY: &str = "Create a one-sentence summary of this person's profile. \
Include the most important details.
Current profile:
{profile}

IMPORTANT: Your response must be EXACTLY ONE sentence that captures the key information.";

/// Every prompt the conversation loop sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// System prompt for question generation and extraction
    pub system: String,

    /// New-topic question when nothing is known yet
    pub new_topic: String,

    /// Appended to `new_topic` when a profile exists
    pub new_topic_with_profile: String,

    /// Per-turn extraction (narrative mode)
    pub process_response: String,

    /// Per-turn extraction (facts mode)
    pub facts_extraction: String,

    /// Opening question for a returning person
    pub initial_question: String,

    /// System prompt for summarization
    pub summary_system: String,

    /// Summarization request
    pub summary: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: SYSTEM.into(),
            new_topic: NEW_TOPIC.into(),
            new_topic_with_profile: NEW_TOPIC_WITH_PROFILE.into(),
            process_response: PROCESS_RESPONSE.into(),
            facts_extraction: FACTS_EXTRACTION.into(),
            initial_question: INITIAL_QUESTION.into(),
            summary_system: SUMMARY_SYSTEM.into(),
            summary: SUMMARY.into(),
        }
    }
}

const PROFILE: &str = "{profile}";
const USER_RESPONSE: &str = "{user_response}";

/// Fill `{profile}` and `{user_response}` placeholders.
///
/// Substitution is a single left-to-right pass over the template, so
/// placeholder text inside the inserted values is left alone.
pub fn render(template: &str, profile: &str, user_response: &str) -> String {
    let mut out = String::with_capacity(template.len() + profile.len() + user_response.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix(PROFILE) {
            out.push_str(profile);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(USER_RESPONSE) {
            out.push_str(user_response);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_both_placeholders() {
        let prompts = PromptSet::default();
        let text = render(&prompts.process_response, "Likes jazz", "I grew up in Oslo");
        assert!(text.contains("Likes jazz"));
        assert!(text.contains("\"I grew up in Oslo\""));
        assert!(!text.contains("{profile}"));
        assert!(!text.contains("{user_response}"));
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        let text = render(
            "P:{profile} U:{user_response}",
            "Writes {user_response} in templates",
            "I like tea",
        );
        assert_eq!(text, "P:Writes {user_response} in templates U:I like tea");

        let text = render("{user_response}|{profile}", "x", "my {profile}");
        assert_eq!(text, "my {profile}|x");
    }

    #[test]
    fn unknown_braces_pass_through() {
        assert_eq!(render("{ \"a\": {profile} }", "1", ""), "{ \"a\": 1 }");
        assert_eq!(render("open { only", "p", "u"), "open { only");
    }

    #[test]
    fn initial_question_names_only_schema_fields() {
        let prompts = PromptSet::default();
        assert!(prompts.initial_question.contains("new_information"));
        assert!(!prompts.initial_question.contains("profile_update"));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let prompts: PromptSet = toml::from_str(r#"system = "Be terse.""#).unwrap();
        assert_eq!(prompts.system, "Be terse.");
        assert_eq!(prompts.summary, PromptSet::default().summary);
    }
}
