//! End-to-end tests for Rapport.
//!
//! These drive whole sessions through the conversation driver against real
//! file stores, with a scripted provider standing in for the model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rapport_agent::{Console, ConversationDriver, SessionEnd};
use rapport_config::{AppConfig, ExtractionMode, ProfileFormat};
use rapport_core::error::ProviderError;
use rapport_core::message::Message;
use rapport_core::profile::{Profile, ProfileStore};
use rapport_core::provider::{Provider, ProviderRequest, ProviderResponse};
use rapport_store::{JsonFileStore, TextFileStore};
use serde_json::json;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Replies with canned JSON bodies in order, recording each request.
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn schema(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n]
            .response_format
            .as_ref()
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = self.calls();
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider exhausted at call #{call}"))
    }
}

fn reply(body: serde_json::Value) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(body.to_string()),
        refusal: None,
        usage: None,
        model: "mock".into(),
    })
}

fn fenced(body: serde_json::Value) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(format!("```json\n{body}\n```")),
        refusal: None,
        usage: None,
        model: "mock".into(),
    })
}

fn refused() -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(""),
        refusal: Some("I can't help with that.".into()),
        usage: None,
        model: "mock".into(),
    })
}

fn learned(new_information: &str) -> Result<ProviderResponse, ProviderError> {
    reply(json!({"new_information": new_information, "question": "unused"}))
}

fn asks(question: &str) -> Result<ProviderResponse, ProviderError> {
    reply(json!({"new_information": "", "question": question}))
}

fn summary(text: &str) -> Result<ProviderResponse, ProviderError> {
    reply(json!({ "summary": text }))
}

// ── Mock Console ─────────────────────────────────────────────────────────

struct ScriptedConsole {
    answers: VecDeque<String>,
    questions: Vec<String>,
    messages: Vec<String>,
}

impl ScriptedConsole {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
            messages: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Console for ScriptedConsole {
    async fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }

    fn say(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

const SIX_LINES: &str = "Works as a nurse\nHas two cats\nGrew up near the sea\n\
Plays the cello\nLearning Portuguese\nRuns on weekends";

// ── E2E: Text profile ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_first_meeting_writes_text_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.txt");
    let provider = Arc::new(ScriptedProvider::new(vec![
        learned("Works as a nurse"),
        asks("Do you have any pets?"),
        learned("Has two cats named Miso and Tofu"),
        asks("What music do you like?"),
    ]));
    let driver = ConversationDriver::from_config(
        &AppConfig::default(),
        provider.clone(),
        "mock",
        Arc::new(TextFileStore::new(&path)),
    );
    let mut console = ScriptedConsole::new(&["I'm a nurse", "Two cats, Miso and Tofu", "quit"]);

    let outcome = driver.run(&mut console).await.unwrap();

    assert_eq!(outcome.turns, 2);
    assert_eq!(outcome.ended_by, SessionEnd::ExitKeyword);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "Works as a nurse\nHas two cats named Miso and Tofu"
    );
    assert_eq!(console.questions[0], "Hi! Tell me something about yourself?");
    assert_eq!(console.questions[2], "What music do you like?");
    assert_eq!(
        console.messages,
        vec!["Thank you for sharing with me! I've learned a lot about you."]
    );
    assert_eq!(provider.schema(0), "ConversationResponse");
}

#[tokio::test]
async fn e2e_returning_person_is_compacted_then_greeted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.txt");
    std::fs::write(&path, format!("{SIX_LINES}\n\n")).unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        fenced(json!({"summary": "A cello-playing nurse who runs and is learning Portuguese."})),
        asks("How is your Portuguese coming along?"),
    ]));
    let driver = ConversationDriver::from_config(
        &AppConfig::default(),
        provider.clone(),
        "mock",
        Arc::new(TextFileStore::new(&path)),
    );
    let mut console = ScriptedConsole::new(&["bye"]);

    driver.run(&mut console).await.unwrap();

    assert_eq!(provider.schema(0), "Summary");
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "A cello-playing nurse who runs and is learning Portuguese."
    );
    assert_eq!(console.questions, vec!["How is your Portuguese coming along?"]);
}

#[tokio::test]
async fn e2e_refused_summary_keeps_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.txt");
    std::fs::write(&path, SIX_LINES).unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        // Explicit compaction at startup, then the over-threshold check on save
        refused(),
        summary(SIX_LINES),
        asks("What's your favourite dish?"),
        // Over-threshold check on the final save
        Err(ProviderError::Network("connection reset".into())),
    ]));
    let driver = ConversationDriver::from_config(
        &AppConfig::default(),
        provider.clone(),
        "mock",
        Arc::new(TextFileStore::new(&path)),
    );
    let mut console = ScriptedConsole::new(&[]);

    let outcome = driver.run(&mut console).await.unwrap();

    assert_eq!(outcome.ended_by, SessionEnd::EndOfInput);
    assert_eq!(outcome.profile.line_count(), 6);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SIX_LINES);
    assert_eq!(provider.calls(), 4);
}

#[tokio::test]
async fn e2e_extraction_failure_recovers_with_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.txt");
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::Timeout("request timed out".into())),
        learned("Lives in Porto"),
        asks("What do you do on weekends?"),
    ]));
    let driver = ConversationDriver::from_config(
        &AppConfig::default(),
        provider,
        "mock",
        Arc::new(TextFileStore::new(&path)),
    );
    let mut console = ScriptedConsole::new(&["Hello there", "I live in Porto", "exit"]);

    let outcome = driver.run(&mut console).await.unwrap();

    assert_eq!(
        console.questions,
        vec![
            "Hi! Tell me something about yourself?",
            "Hi! Tell me something about yourself?",
            "What do you do on weekends?",
        ]
    );
    assert_eq!(outcome.profile.narrative, "Lives in Porto");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Lives in Porto");
}

// ── E2E: JSON profile ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_facts_mode_persists_versioned_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");

    let mut config = AppConfig::default();
    config.profile.path = path.to_string_lossy().into_owned();
    config.conversation.extraction = ExtractionMode::Facts;
    assert_eq!(config.profile.resolved_format(), ProfileFormat::Json);

    let provider = Arc::new(ScriptedProvider::new(vec![
        reply(json!({
            "extracted_facts": [
                {"topic": "travel", "fact": "Visited Japan last spring", "confidence": 0.9},
                {"topic": "food", "fact": "Might like sushi", "confidence": 0.3}
            ],
            "follow_up_question": "What did you eat in Japan?",
            "reasoning": "The trip was stated; the food preference is a guess"
        })),
        asks("Do you play any sports?"),
    ]));
    let driver = ConversationDriver::from_config(
        &config,
        provider.clone(),
        "mock",
        rapport_store::open(&config.profile),
    );
    let mut console = ScriptedConsole::new(&["I went to Japan last spring, loved it", "bye"]);

    driver.run(&mut console).await.unwrap();

    assert_eq!(provider.schema(0), "FactExtraction");
    assert_eq!(console.questions[1], "Do you play any sports?");

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["version"], 1);
    assert_eq!(document["narrative"], "travel: Visited Japan last spring");
    assert_eq!(document["facts"].as_array().unwrap().len(), 1);

    let profile = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(profile.facts[0].topic, "travel");
}

#[tokio::test]
async fn e2e_exit_immediately_leaves_json_profile_as_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(
        &path,
        json!({"version": 1, "narrative": "Speaks three languages"}).to_string(),
    )
    .unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        summary("Multilingual."),
        asks("Which language did you learn last?"),
    ]));
    let store = Arc::new(JsonFileStore::new(&path));
    let driver = ConversationDriver::from_config(&AppConfig::default(), provider, "mock", store);
    let mut console = ScriptedConsole::new(&["EXIT"]);

    let outcome = driver.run(&mut console).await.unwrap();

    // A one-line summary of a one-line profile is not shorter, so nothing changes.
    assert_eq!(outcome.turns, 0);
    assert_eq!(outcome.profile, Profile::from_narrative("Speaks three languages"));

    let reloaded = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(reloaded, Profile::from_narrative("Speaks three languages"));
}
