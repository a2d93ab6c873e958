//! Scripted completion provider.
//!
//! Replays a fixed queue of responses in order and records every prompt it
//! receives. Test builds only; drives the orchestrator and routes without a
//! network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llms::base_llm::{BaseLLM, Completion, GenerationConfig};

const PROVIDER: &str = "scripted";

/// One canned answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedResponse {
    /// The model produces this text.
    Text(String),
    /// The model answers without any text.
    Empty,
    /// The call fails with this provider error message.
    Error(String),
}

/// A prompt the scripted model was asked to complete.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub config: GenerationConfig,
}

/// A [`BaseLLM`] that answers from a queue.
#[derive(Debug)]
pub struct ScriptedLLM {
    model: String,
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLLM {
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            model: "scripted".to_string(),
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a script of plain text answers.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| ScriptedResponse::Text(t.into())))
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl BaseLLM for ScriptedLLM {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<Completion, LlmError> {
        let call = {
            let mut calls = self.calls.lock().map_err(|_| LlmError::Api {
                provider: PROVIDER.to_string(),
                message: "call log lock poisoned".to_string(),
            })?;
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                config: *config,
            });
            calls.len()
        };

        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match next {
            Some(ScriptedResponse::Text(text)) => Ok(Completion::from_text(text)),
            Some(ScriptedResponse::Empty) => Ok(Completion::empty()),
            Some(ScriptedResponse::Error(message)) => Err(LlmError::Api {
                provider: PROVIDER.to_string(),
                message,
            }),
            None => Err(LlmError::Exhausted { call }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_records_prompts() {
        let llm = ScriptedLLM::from_texts(["first", "second"]);
        let config = GenerationConfig::new(0.7, 500);

        let a = llm.generate("p1", &config).await.unwrap();
        let b = llm.generate("p2", &config).await.unwrap();
        assert_eq!(a.text.as_deref(), Some("first"));
        assert_eq!(b.text.as_deref(), Some("second"));

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "p1");
        assert_eq!(calls[1].config, config);
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let llm = ScriptedLLM::new(Vec::<ScriptedResponse>::new());
        let err = llm
            .generate("p", &GenerationConfig::new(0.0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Exhausted { call: 1 }));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_error_and_empty_responses() {
        let llm = ScriptedLLM::new([
            ScriptedResponse::Empty,
            ScriptedResponse::Error("boom".to_string()),
        ]);
        let config = GenerationConfig::new(0.0, 1);
        assert!(llm.generate("a", &config).await.unwrap().text.is_none());
        let err = llm.generate("b", &config).await.unwrap_err();
        assert_eq!(err.to_string(), "scripted API error: boom");
    }
}
