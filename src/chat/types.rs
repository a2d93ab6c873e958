//! Wire types for a chat turn.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Feedback line used when the evaluator output cannot be parsed.
pub const EVALUATION_FAILED_FEEDBACK: &str = "Evaluation failed. Please retry.";

/// One line of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatLogEntry {
    pub sender: String,
    pub text: String,
}

impl ChatLogEntry {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub scenario_id: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub chat_log: Vec<ChatLogEntry>,
}

/// Response to a chat turn: either the stakeholder's next line or the final
/// evaluation.
///
/// Serializes as `{"reply": "..."}` or `{"evaluation": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatResponse {
    Reply(String),
    Evaluation(EvaluationResult),
}

impl ChatResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }
}

/// The evaluator's verdict on a finished conversation.
///
/// Holds whatever JSON the evaluator produced, unchanged. Conventionally an
/// object with `scores`, `total`, `max` and `feedback`, but nothing here
/// enforces that shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EvaluationResult(Value);

impl EvaluationResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Placeholder returned when the evaluator output is not valid JSON.
    pub fn parse_failure(raw: impl Into<String>) -> Self {
        let raw: String = raw.into();
        Self(json!({
            "scores": {},
            "total": 0,
            "max": 0,
            "feedback": [EVALUATION_FAILED_FEEDBACK],
            "raw": raw,
        }))
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
