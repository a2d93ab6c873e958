//! Interpreting model output.
//!
//! Models are told to answer with a bare JSON object but regularly wrap it
//! in a Markdown code fence anyway. [`normalize_model_output`] undoes that
//! before any JSON parsing happens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::chat::types::EvaluationResult;

static LEADING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```[a-zA-Z]*\r?\n?").unwrap());
static TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```$").unwrap());
static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:json)\r?\n").unwrap());

/// Strip surrounding code-fence markup and a stray leading `json` tag line.
pub fn normalize_model_output(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_open = LEADING_FENCE.replace(trimmed, "");
    let without_close = TRAILING_FENCE.replace(without_open.trim_end(), "");
    let without_tag = LANGUAGE_TAG.replace(without_close.trim_start(), "");
    without_tag.trim().to_string()
}

/// Conversation state declared by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStatus {
    Continue,
    End,
    /// Missing or unrecognized status value.
    Other(Option<String>),
}

impl From<Option<String>> for ConversationStatus {
    fn from(status: Option<String>) -> Self {
        match status.as_deref() {
            Some("continue") => Self::Continue,
            Some("end") => Self::End,
            _ => Self::Other(status),
        }
    }
}

/// The role-play model's structured answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub reply: Option<String>,
    pub status: ConversationStatus,
}

/// Outcome of parsing role-play output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    Ok(ModelReply),
    /// Output was not a JSON object; holds the raw text.
    ParseError(String),
}

/// Text of a reply field. Strings pass through; other non-null values are
/// rendered as JSON.
fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse role-play output into a [`ParsedReply`].
pub fn parse_model_reply(raw: &str) -> ParsedReply {
    let clean = normalize_model_output(raw);
    match serde_json::from_str::<Value>(&clean) {
        Ok(Value::Object(object)) => ParsedReply::Ok(ModelReply {
            reply: field_text(&object, "reply"),
            status: field_text(&object, "status").into(),
        }),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), raw = %raw.trim(), "role-play output is not a JSON object");
            ParsedReply::ParseError(raw.trim().to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, raw = %raw.trim(), "role-play output is not valid JSON");
            ParsedReply::ParseError(raw.trim().to_string())
        }
    }
}

/// Parse evaluator output. Any valid JSON is returned as-is; anything else
/// becomes [`EvaluationResult::parse_failure`].
pub fn parse_evaluation(raw: &str) -> EvaluationResult {
    let clean = normalize_model_output(raw);
    match serde_json::from_str::<Value>(&clean) {
        Ok(value) => EvaluationResult::new(value),
        Err(e) => {
            tracing::warn!(error = %e, raw = %raw.trim(), "evaluation output is not valid JSON");
            EvaluationResult::parse_failure(raw.trim())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::EVALUATION_FAILED_FEEDBACK;

    #[test]
    fn test_normalize_strips_fences() {
        let plain = r#"{"reply":"Hi","status":"continue"}"#;
        assert_eq!(normalize_model_output(plain), plain);
        assert_eq!(normalize_model_output(&format!("```json\n{plain}\n```")), plain);
        assert_eq!(normalize_model_output(&format!("```\n{plain}\n```")), plain);
        assert_eq!(normalize_model_output(&format!("  ```JSON\n{plain}```  \n")), plain);
    }

    #[test]
    fn test_normalize_strips_bare_language_tag() {
        let plain = r#"{"reply":"Hi","status":"end"}"#;
        assert_eq!(normalize_model_output(&format!("json\n{plain}")), plain);
        assert_eq!(normalize_model_output(&format!("```\njson\n{plain}\n```")), plain);
    }

    #[test]
    fn test_normalize_keeps_json_inside_content() {
        let text = r#"{"reply":"send it as json\nplease","status":"continue"}"#;
        assert_eq!(normalize_model_output(text), text);
    }

    #[test]
    fn test_parse_continue() {
        let parsed = parse_model_reply(r#"{"reply":"Hello","status":"continue"}"#);
        assert_eq!(
            parsed,
            ParsedReply::Ok(ModelReply {
                reply: Some("Hello".to_string()),
                status: ConversationStatus::Continue,
            })
        );
    }

    #[test]
    fn test_fenced_and_plain_parse_identically() {
        let plain = r#"{"reply":"Goodbye","status":"end"}"#;
        let fenced = format!("```json\n{plain}\n```");
        assert_eq!(parse_model_reply(plain), parse_model_reply(&fenced));

        let eval = r#"{"scores":{"Empathy":4},"total":4,"max":5,"feedback":["ok"]}"#;
        let fenced_eval = format!("```json\n{eval}\n```");
        assert_eq!(parse_evaluation(eval), parse_evaluation(&fenced_eval));
    }

    #[test]
    fn test_unknown_and_missing_status() {
        let parsed = parse_model_reply(r#"{"reply":"Hmm","status":"pause"}"#);
        let ParsedReply::Ok(reply) = parsed else {
            panic!("should parse");
        };
        assert_eq!(reply.status, ConversationStatus::Other(Some("pause".to_string())));

        let parsed = parse_model_reply(r#"{"reply":"Hmm"}"#);
        let ParsedReply::Ok(reply) = parsed else {
            panic!("should parse");
        };
        assert_eq!(reply.status, ConversationStatus::Other(None));
    }

    #[test]
    fn test_prose_is_parse_error_with_raw_text() {
        let parsed = parse_model_reply("  Sure! Here is my answer.  ");
        assert_eq!(
            parsed,
            ParsedReply::ParseError("Sure! Here is my answer.".to_string())
        );
        assert!(matches!(parse_model_reply("[1, 2]"), ParsedReply::ParseError(_)));
        assert!(matches!(
            parse_model_reply(r#"["Hi", "continue"]"#),
            ParsedReply::ParseError(_)
        ));
    }

    #[test]
    fn test_non_string_reply_fields_are_rendered() {
        let parsed = parse_model_reply(r#"{"reply": 42, "status": "continue"}"#);
        assert_eq!(
            parsed,
            ParsedReply::Ok(ModelReply {
                reply: Some("42".to_string()),
                status: ConversationStatus::Continue,
            })
        );

        let ParsedReply::Ok(reply) = parse_model_reply(r#"{"reply": "Hm", "status": true}"#) else {
            panic!("should parse");
        };
        assert_eq!(reply.reply.as_deref(), Some("Hm"));
        assert_eq!(reply.status, ConversationStatus::Other(Some("true".to_string())));

        let ParsedReply::Ok(reply) = parse_model_reply(r#"{"reply": null, "status": "end"}"#) else {
            panic!("should parse");
        };
        assert_eq!(reply.reply, None);
        assert_eq!(reply.status, ConversationStatus::End);
    }

    #[test]
    fn test_invalid_evaluation_falls_back() {
        let result = parse_evaluation("The candidate did well overall.");
        assert_eq!(
            result.into_value(),
            serde_json::json!({
                "scores": {},
                "total": 0,
                "max": 0,
                "feedback": [EVALUATION_FAILED_FEEDBACK],
                "raw": "The candidate did well overall."
            })
        );
    }

    #[test]
    fn test_loosely_typed_evaluation_is_kept() {
        let raw = r#"{"scores":{"Empathy":20},"total":"20","max":"25","feedback":"Be warmer."}"#;
        assert_eq!(
            parse_evaluation(raw).into_value(),
            serde_json::json!({
                "scores": {"Empathy": 20},
                "total": "20",
                "max": "25",
                "feedback": "Be warmer."
            })
        );

        let raw = r#"{"scores":{},"total":3,"max":5,"feedback":[{"point":"Listen more"}]}"#;
        let result = parse_evaluation(raw);
        assert_eq!(result.get("feedback").unwrap()[0]["point"], "Listen more");
        assert!(result.get("raw").is_none());
    }

    #[test]
    fn test_evaluation_missing_fields_are_not_filled_in() {
        let result = parse_evaluation(r#"{"scores":{"Empathy":20},"total":20,"feedback":["ok"]}"#);
        assert!(result.get("max").is_none());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"scores": {"Empathy": 20}, "total": 20, "feedback": ["ok"]})
        );
    }

    #[test]
    fn test_evaluation_key_order_is_preserved() {
        let raw = r#"{"total":7,"scores":{"b":1,"a":2},"max":10}"#;
        assert_eq!(serde_json::to_string(&parse_evaluation(raw)).unwrap(), raw);
    }
}
