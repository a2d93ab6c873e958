//! Prompt templates and prompt assembly.
//!
//! Two instruction templates are read from disk at startup: the role-play
//! system instruction and the evaluator instruction. Either may be absent,
//! in which case it contributes an empty string.

use std::path::Path;

use crate::chat::types::ChatLogEntry;
use crate::error::Result;
use crate::scenario::Scenario;

/// File name of the role-play instruction template.
pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";

/// File name of the evaluator instruction template.
pub const EVALUATOR_PROMPT_FILE: &str = "evaluator_prompt.txt";

/// Instruction templates prepended to every prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system: String,
    pub evaluator: String,
}

impl PromptTemplates {
    pub fn new(system: impl Into<String>, evaluator: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            evaluator: evaluator.into(),
        }
    }

    /// Read both templates from `dir`. Missing or unreadable files yield
    /// empty templates.
    pub fn load(dir: &Path) -> Self {
        Self {
            system: read_template(&dir.join(SYSTEM_PROMPT_FILE)),
            evaluator: read_template(&dir.join(EVALUATOR_PROMPT_FILE)),
        }
    }

    /// Build the prompt asking the model for the stakeholder's next line.
    pub fn roleplay_prompt(
        &self,
        user_message: &str,
        chat_log: &[ChatLogEntry],
        scenario: &Scenario,
    ) -> Result<String> {
        let stakeholders = serde_json::to_string(&scenario.stakeholders)?;
        let culture_profile = serde_json::to_string(&scenario.culture_profile_used)?;
        let prev_turns = transcript(chat_log);

        Ok(format!(
            r#"
{system}

You are roleplaying as a stakeholder in this scenario.  
Reply ONLY with the stakeholder’s next line of dialogue (1–3 sentences).  
Do NOT speak for the user.  
Do NOT summarize the whole scenario.  

After your dialogue, decide whether the conversation should:
- "continue" → if there are still unresolved issues or more steps to play out.  
- "end" → if a natural resolution has been reached (agreement, apology, decision, or clear closure), OR if the user is completely off-topic and the scenario cannot continue.  

⚠️ IMPORTANT: Output must be strict JSON only.
Do not include code fences (```), markdown, or extra text.
Return only one JSON object, in this format:

{{
  "reply": "your stakeholder message here",
  "status": "continue" OR "end"
}}

Scenario Title: {title}
Persona: {persona}
Context: {context}
Country: {country}
Stakeholders: {stakeholders}
Culture Profile: {culture_profile}

Conversation so far:
{prev_turns}

USER just said: {user_message}
"#,
            system = self.system,
            title = scenario.title,
            persona = scenario.persona,
            context = scenario.context,
            country = scenario.country_or_default(),
        ))
    }

    /// Build the prompt asking the model to score a finished conversation.
    ///
    /// `chat_log` must already contain the closing turns.
    pub fn evaluator_prompt(&self, chat_log: &[ChatLogEntry], scenario: &Scenario) -> Result<String> {
        let snapshot = serde_json::to_string_pretty(scenario.document())?;
        let rubric = serde_json::to_string_pretty(&scenario.evaluation_rubric)?;
        let full_conversation = transcript(chat_log);

        Ok(format!(
            r#"
{evaluator}

Scenario Snapshot:
{snapshot}

Evaluation Rubric:
{rubric}

Conversation:
{full_conversation}
"#,
            evaluator = self.evaluator,
        ))
    }
}

/// Render turns as `sender: text`, one per line, in order.
pub fn transcript(chat_log: &[ChatLogEntry]) -> String {
    chat_log
        .iter()
        .map(|entry| format!("{}: {}", entry.sender, entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_template(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "prompt template unavailable, using empty template");
            String::new()
        }
    }
}
