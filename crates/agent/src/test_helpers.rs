//! Shared test helpers: a scripted provider and a scripted console.

use std::collections::VecDeque;
use std::sync::Mutex;
use rapport_core::error::ProviderError;
use rapport_core::message::Message;
use rapport_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use crate::driver::Console;

/// A mock provider that returns a sequence of scripted outcomes.
///
/// Each call to `complete` returns the next outcome in the queue and
/// records the request. Panics if more calls are made than outcomes provided.
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that must never be called.
    pub fn silent() -> Self {
        Self::new(vec![])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The user prompt of the n-th request.
    pub fn prompt(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n].messages[1].content.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = self.call_count();
        self.requests.lock().unwrap().push(request);
        self.outcomes.lock().unwrap().pop_front().unwrap_or_else(|| {
            panic!("ScriptedProvider: no more outcomes (call #{call})")
        })
    }
}

/// A response whose content is the given JSON value.
pub fn json_reply(value: serde_json::Value) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(value.to_string()),
        refusal: None,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A response where the model declined.
pub fn refusal_reply(reason: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(""),
        refusal: Some(reason.into()),
        usage: None,
        model: "mock-model".into(),
    }
}

pub fn summary_reply(summary: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(json_reply(serde_json::json!({ "summary": summary })))
}

pub fn conversation_reply(new_information: &str, question: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(json_reply(serde_json::json!({
        "new_information": new_information,
        "question": question,
    })))
}

pub fn network_failure() -> Result<ProviderResponse, ProviderError> {
    Err(ProviderError::Network("connection reset by peer".into()))
}

/// A console fed from a list of lines; records everything shown.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub asked: Vec<String>,
    pub said: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl Console for ScriptedConsole {
    async fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        self.asked.push(question.to_string());
        Ok(self.inputs.pop_front())
    }

    fn say(&mut self, text: &str) {
        self.said.push(text.to_string());
    }
}

/// Six lines, one over the default compaction threshold.
pub fn six_line_narrative() -> String {
    [
        "Works as a nurse",
        "Has two cats",
        "Grew up near the sea",
        "Plays the cello",
        "Learning Portuguese",
        "Runs on weekends",
    ]
    .join("\n")
}
