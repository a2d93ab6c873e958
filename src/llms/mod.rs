//! LLM layer.
//!
//! - [`base_llm`] - The trait every model provider implements
//! - [`providers`] - Concrete providers (Gemini; a scripted one in tests)

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, BaseLLMState, Completion, GenerationConfig, TokenUsage};
pub use providers::gemini::GeminiCompletion;
