//! # roleplay-relay
//!
//! Backend relay between a web client and a generative text model for
//! soft-skills role-play practice.
//!
//! A chat turn names a scenario (persona, context, stakeholders, rubric).
//! The relay asks the model to answer as a stakeholder in strict JSON with a
//! `reply` and a `status`. While the status is `"continue"` the reply is
//! passed back to the client; once the model says `"end"` the whole
//! conversation is sent back to the model with the scenario's rubric and the
//! resulting scores are returned instead.
//!
//! Client-facing calls never fail outright: missing scenarios, unparsable
//! model output and provider errors all degrade to a textual reply.

pub mod chat;
pub mod config;
pub mod error;
pub mod llms;
pub mod scenario;
pub mod server;

pub use chat::{ChatLogEntry, ChatOrchestrator, ChatRequest, ChatResponse, EvaluationResult};
pub use config::RelayConfig;
pub use error::{LlmError, RelayError};
pub use llms::{BaseLLM, GeminiCompletion, GenerationConfig};
pub use scenario::{Scenario, ScenarioStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
