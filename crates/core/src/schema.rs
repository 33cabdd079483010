//! Structured-output schemas exchanged with the gateway.
//!
//! Each type pairs its serde shape with the JSON Schema sent to the
//! backend. Schemas follow strict-mode rules: every property is required
//! and no extra properties are allowed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A type the gateway can ask a model to produce.
pub trait StructuredOutput: DeserializeOwned + Send {
    /// Schema name reported to the backend.
    const NAME: &'static str;

    /// JSON Schema of the object.
    fn json_schema() -> serde_json::Value;
}

/// Per-turn reply: what was learned, and a question to ask next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub new_information: String,
    pub question: String,
}

impl StructuredOutput for ConversationResponse {
    const NAME: &'static str = "ConversationResponse";

    fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "new_information": {
                    "type": "string",
                    "description": "New facts learned about the person, or empty"
                },
                "question": {
                    "type": "string",
                    "description": "The next question to ask"
                }
            },
            "required": ["new_information", "question"],
            "additionalProperties": false
        })
    }
}

/// A one-sentence restatement of the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
}

impl StructuredOutput for Summary {
    const NAME: &'static str = "Summary";

    fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" }
            },
            "required": ["summary"],
            "additionalProperties": false
        })
    }
}

/// One fact proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFact {
    pub topic: String,
    pub fact: String,
    pub confidence: f32,
}

/// Per-turn reply in facts mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactExtraction {
    pub extracted_facts: Vec<ExtractedFact>,
    pub follow_up_question: String,
    pub reasoning: String,
}

impl StructuredOutput for FactExtraction {
    const NAME: &'static str = "FactExtraction";

    fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "extracted_facts": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": { "type": "string" },
                            "fact": { "type": "string" },
                            "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                        },
                        "required": ["topic", "fact", "confidence"],
                        "additionalProperties": false
                    }
                },
                "follow_up_question": { "type": "string" },
                "reasoning": { "type": "string" }
            },
            "required": ["extracted_facts", "follow_up_question", "reasoning"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_fields(schema: &serde_json::Value) -> Vec<String> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn conversation_schema_matches_struct_fields() {
        let schema = ConversationResponse::json_schema();
        assert_eq!(required_fields(&schema), vec!["new_information", "question"]);

        let parsed: ConversationResponse =
            serde_json::from_str(r#"{"new_information":"Has a dog","question":"Any siblings?"}"#)
                .unwrap();
        assert_eq!(parsed.new_information, "Has a dog");
    }

    #[test]
    fn fact_extraction_parses_nested_facts() {
        let parsed: FactExtraction = serde_json::from_str(
            r#"{
                "extracted_facts": [{"topic": "pets", "fact": "Has a dog", "confidence": 0.8}],
                "follow_up_question": "What's the dog's name?",
                "reasoning": "Mentioned walking the dog"
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.extracted_facts.len(), 1);
        assert_eq!(parsed.extracted_facts[0].topic, "pets");
    }

    #[test]
    fn schemas_forbid_extra_properties() {
        for schema in [
            ConversationResponse::json_schema(),
            Summary::json_schema(),
            FactExtraction::json_schema(),
        ] {
            assert_eq!(schema["additionalProperties"], serde_json::json!(false));
        }
    }
}
