//! The chat turn state machine.
//!
//! One turn is: load scenario, role-play call, parse, and on `"end"` a
//! second evaluator call. Nothing here ever fails the request; every error
//! path degrades to a textual reply.

use std::sync::Arc;

use crate::chat::parse::{parse_evaluation, parse_model_reply, ConversationStatus, ModelReply, ParsedReply};
use crate::chat::prompts::PromptTemplates;
use crate::chat::types::{ChatLogEntry, ChatRequest, ChatResponse, EvaluationResult};
use crate::error::Result;
use crate::llms::base_llm::{BaseLLM, GenerationConfig};
use crate::scenario::{Scenario, ScenarioLookup, ScenarioStore};

/// Sampling for the stakeholder's reply.
pub const ROLEPLAY_GENERATION: GenerationConfig = GenerationConfig::new(0.7, 500);

/// Sampling for the evaluator.
pub const EVALUATION_GENERATION: GenerationConfig = GenerationConfig::new(0.0, 1024);

/// Reply when the model answers without any text.
pub const NO_RESPONSE_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Reply when a `"continue"` answer omits the `reply` field.
const MISSING_REPLY_PLACEHOLDER: &str = "...";

/// Sender label for the user's turns in the evaluator transcript.
pub const USER_SENDER: &str = "user";

/// Sender label for the model's turns in the evaluator transcript.
pub const BOT_SENDER: &str = "bot";

/// Turns chat requests into replies or evaluations.
#[derive(Debug, Clone)]
pub struct ChatOrchestrator {
    llm: Arc<dyn BaseLLM>,
    store: ScenarioStore,
    templates: PromptTemplates,
}

impl ChatOrchestrator {
    pub fn new(llm: Arc<dyn BaseLLM>, store: ScenarioStore, templates: PromptTemplates) -> Self {
        Self {
            llm,
            store,
            templates,
        }
    }

    pub fn llm(&self) -> &Arc<dyn BaseLLM> {
        &self.llm
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    /// Handle one chat turn.
    #[tracing::instrument(skip_all, fields(scenario_id = %request.scenario_id, turns = request.chat_log.len()))]
    pub async fn handle_chat_turn(&self, request: &ChatRequest) -> ChatResponse {
        let scenario = match self.store.load(&request.scenario_id).await {
            Ok(ScenarioLookup::Found(scenario)) => scenario,
            Ok(ScenarioLookup::Missing(path)) => {
                tracing::warn!(path = %path.display(), "scenario file not found");
                return ChatResponse::reply(format!("Scenario file not found at {}", path.display()));
            }
            Err(e) => {
                let path = self.store.path_for(&request.scenario_id);
                tracing::error!(path = %path.display(), error = %e, "failed to load scenario");
                return ChatResponse::reply(format!(
                    "Failed to load scenario at {}: {}",
                    path.display(),
                    e
                ));
            }
        };

        match self.run_turn(request, &scenario).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "role-play turn failed");
                ChatResponse::reply(format!("Sorry, an error occurred: {}", e))
            }
        }
    }

    async fn run_turn(&self, request: &ChatRequest, scenario: &Scenario) -> Result<ChatResponse> {
        let prompt = self
            .templates
            .roleplay_prompt(&request.message, &request.chat_log, scenario)?;
        let completion = self.llm.generate(&prompt, &ROLEPLAY_GENERATION).await?;

        let Some(text) = completion.text else {
            tracing::warn!(model = self.llm.model(), "model returned no text");
            return Ok(ChatResponse::reply(NO_RESPONSE_REPLY));
        };
        let raw_text = text.trim();

        let response = match parse_model_reply(raw_text) {
            ParsedReply::ParseError(raw) => ChatResponse::Reply(raw),
            ParsedReply::Ok(ModelReply {
                reply,
                status: ConversationStatus::Continue,
            }) => ChatResponse::Reply(reply.unwrap_or_else(|| MISSING_REPLY_PLACEHOLDER.to_string())),
            ParsedReply::Ok(ModelReply {
                reply,
                status: ConversationStatus::End,
            }) => {
                tracing::info!("model ended the conversation, requesting evaluation");
                let closing = reply.unwrap_or_default();
                ChatResponse::Evaluation(self.evaluate(request, &closing, scenario).await?)
            }
            ParsedReply::Ok(ModelReply {
                reply,
                status: ConversationStatus::Other(status),
            }) => {
                tracing::debug!(?status, "unrecognized conversation status");
                ChatResponse::Reply(reply.unwrap_or_else(|| raw_text.to_string()))
            }
        };
        Ok(response)
    }

    /// Score the conversation including the current turn and the closing reply.
    async fn evaluate(
        &self,
        request: &ChatRequest,
        closing_reply: &str,
        scenario: &Scenario,
    ) -> Result<EvaluationResult> {
        let mut conversation = Vec::with_capacity(request.chat_log.len() + 2);
        conversation.extend(request.chat_log.iter().cloned());
        conversation.push(ChatLogEntry::new(USER_SENDER, request.message.as_str()));
        conversation.push(ChatLogEntry::new(BOT_SENDER, closing_reply));

        let prompt = self.templates.evaluator_prompt(&conversation, scenario)?;
        let completion = self.llm.generate(&prompt, &EVALUATION_GENERATION).await?;
        Ok(parse_evaluation(completion.text.as_deref().unwrap_or_default()))
    }
}
