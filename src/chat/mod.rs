//! Chat orchestration.
//!
//! - [`types`] - Request/response wire types and the evaluation record
//! - [`prompts`] - Instruction templates and prompt assembly
//! - [`parse`] - Code-fence normalization and model output parsing
//! - [`orchestrator`] - The per-turn state machine

pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod types;

pub use orchestrator::ChatOrchestrator;
pub use parse::{ConversationStatus, ModelReply, ParsedReply};
pub use prompts::PromptTemplates;
pub use types::{ChatLogEntry, ChatRequest, ChatResponse, EvaluationResult};
