//! Google Gemini completion provider.
//!
//! Talks to the Gemini REST API (`models/{model}:generateContent`) directly
//! over `reqwest`. The relay only ever sends a single user turn, so the
//! request body is a one-element `contents` array plus a
//! `generationConfig` carrying temperature and the output-token cap.
//!
//! # Authentication
//!
//! Uses the API key passed at construction, which the relay reads from
//! `GOOGLE_API_KEY` or `GEMINI_API_KEY`. A missing key is not an error until
//! the first call is made.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LlmError;
use crate::llms::base_llm::{BaseLLM, BaseLLMState, Completion, GenerationConfig, TokenUsage};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used by the relay.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

const PROVIDER: &str = "gemini";

// ---------------------------------------------------------------------------
// GeminiCompletion provider
// ---------------------------------------------------------------------------

/// Gemini `generateContent` client.
///
/// # Example
///
/// ```ignore
/// let provider = GeminiCompletion::new("gemini-1.5-flash-latest", Some(key));
/// let completion = provider
///     .generate("Say hello", &GenerationConfig::new(0.7, 500))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct GeminiCompletion {
    /// Shared base LLM state.
    pub state: BaseLLMState,
    /// Optional per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    client: reqwest::Client,
}

impl GeminiCompletion {
    /// Create a new Gemini completion provider.
    ///
    /// # Arguments
    ///
    /// * `model` - Gemini model name (e.g., "gemini-1.5-flash-latest").
    /// * `api_key` - API key; calls fail with [`LlmError::MissingApiKey`] when absent.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let mut state = BaseLLMState::new(model, PROVIDER);
        state.api_key = api_key;
        state.base_url = Some(DEFAULT_BASE_URL.to_string());

        Self {
            state,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.state.base_url = Some(base_url.into());
        self
    }

    /// Bound each outbound call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the API endpoint URL.
    fn api_endpoint(&self) -> String {
        let base = self
            .state
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent",
            base, self.state.model
        )
    }

    /// Build the `generationConfig` object for the Gemini API.
    pub fn generation_config(config: &GenerationConfig) -> Value {
        serde_json::json!({
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens,
        })
    }

    /// Build the complete request body.
    fn build_request_body(prompt: &str, config: &GenerationConfig) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": Self::generation_config(config),
        })
    }

    /// Parse a Gemini API response into a [`Completion`].
    ///
    /// The text of every part of the first candidate is concatenated. A
    /// response without candidates, or whose first candidate has no text,
    /// yields an empty completion rather than an error.
    fn parse_response(response: &Value) -> Completion {
        let usage = Self::extract_token_usage(response);

        let parts = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|p| p.as_array());

        let Some(parts) = parts else {
            if let Some(reason) = response
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str())
            {
                log::warn!("Gemini returned no candidates: blockReason={}", reason);
            }
            return Completion { text: None, usage };
        };

        let text_parts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        let text = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.concat())
        };

        Completion { text, usage }
    }

    /// Extract token usage from a Gemini response.
    fn extract_token_usage(response: &Value) -> Option<TokenUsage> {
        let usage_obj = response.get("usageMetadata")?;
        let count = |field: &str| usage_obj.get(field).and_then(|v| v.as_i64()).unwrap_or(0);

        let prompt_tokens = count("promptTokenCount");
        let completion_tokens = count("candidatesTokenCount");
        Some(TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        })
    }
}

#[async_trait]
impl BaseLLM for GeminiCompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<Completion, LlmError> {
        log::debug!(
            "GeminiCompletion.generate: model={}, prompt_len={}, temperature={}, max_output_tokens={}",
            self.state.model,
            prompt.len(),
            config.temperature,
            config.max_output_tokens,
        );

        let api_key = match self.state.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(LlmError::MissingApiKey {
                    provider: "Gemini".to_string(),
                })
            }
        };

        let body = Self::build_request_body(prompt, config);

        let mut request = self
            .client
            .post(self.api_endpoint())
            .header("content-type", "application/json")
            .query(&[("key", api_key)])
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: response_text,
            });
        }

        let response_json: Value =
            serde_json::from_str(&response_text).map_err(|e| LlmError::Decode {
                provider: PROVIDER.to_string(),
                message: format!(
                    "{} - Body: {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                ),
            })?;

        if let Some(error) = response_json.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Gemini API error")
                .to_string();
            return Err(LlmError::Api {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        let completion = Self::parse_response(&response_json);
        if let Some(usage) = completion.usage {
            log::debug!("Gemini usage: {:?}", usage);
        }
        Ok(completion)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
