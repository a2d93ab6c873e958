//! Error types for the relay.
//!
//! Failures inside a chat turn never reach the client as a transport error;
//! the orchestrator folds them into a reply string. These types exist so the
//! layers below it can still propagate with `?`.

use thiserror::Error;

/// Errors raised by a model provider while producing a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No credential was configured for the provider.
    #[error("{provider} API key not set. Set GOOGLE_API_KEY or GEMINI_API_KEY environment variable.")]
    MissingApiKey { provider: String },

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider body was not the JSON shape we expect.
    #[error("failed to parse {provider} response: {message}")]
    Decode { provider: String, message: String },

    /// The provider returned an `error` object.
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// A scripted model ran out of canned responses.
    #[error("no scripted response left for call #{call}")]
    Exhausted { call: usize },
}

/// Top-level error type for configuration, storage and orchestration.
#[derive(Debug, Error)]
pub enum RelayError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// An environment setting could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;
