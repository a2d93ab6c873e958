//! Process configuration.
//!
//! Everything is read once at startup from the environment (after an
//! optional `.env` file has been merged into it) and then passed around
//! immutably.
//!
//! # Environment Variables
//!
//! - `GOOGLE_API_KEY` / `GEMINI_API_KEY`: model credential (optional at startup)
//! - `GEMINI_MODEL`: model name (default: `gemini-1.5-flash-latest`)
//! - `GEMINI_BASE_URL`: API root (default: `https://generativelanguage.googleapis.com`)
//! - `RELAY_SCENARIOS_DIR`: scenario JSON directory (default: `scenarios`)
//! - `RELAY_PROMPTS_DIR`: prompt template directory (default: `prompts`)
//! - `RELAY_REQUEST_TIMEOUT_SECS`: outbound call timeout (default: none)
//! - `PORT`: HTTP port (default: 8000)

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::chat::{ChatOrchestrator, PromptTemplates};
use crate::error::{RelayError, Result};
use crate::llms::providers::gemini::{GeminiCompletion, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::scenario::ScenarioStore;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Relay settings.
#[derive(Clone, PartialEq)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: String,
    pub scenarios_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub request_timeout: Option<Duration>,
    pub port: u16,
    /// The `.env` file that was merged into the environment, if any.
    pub dotenv_path: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            scenarios_dir: PathBuf::from("scenarios"),
            prompts_dir: PathBuf::from("prompts"),
            request_timeout: None,
            port: DEFAULT_PORT,
            dotenv_path: None,
        }
    }
}

impl RelayConfig {
    /// Load `.env` if one is found, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let dotenv_path = dotenvy::dotenv().ok();
        Self::from_process_env(dotenv_path)
    }

    /// Merge the env file at `path` into the process environment, then read
    /// it. Variables already set in the process are not overridden.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        dotenvy::from_path(path)
            .map_err(|e| RelayError::Config(format!("{}: {e}", path.display())))?;
        Self::from_process_env(Some(path.to_path_buf()))
    }

    fn from_process_env(dotenv_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.dotenv_path = dotenv_path;
        Ok(config)
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| RelayError::Config(format!("PORT={raw:?}: {e}")))?,
            None => defaults.port,
        };

        let request_timeout = match get("RELAY_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse::<u64>().map_err(
                |e| RelayError::Config(format!("RELAY_REQUEST_TIMEOUT_SECS={raw:?}: {e}")),
            )?)),
            None => None,
        };

        Ok(Self {
            api_key: get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            scenarios_dir: get("RELAY_SCENARIOS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scenarios_dir),
            prompts_dir: get("RELAY_PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.prompts_dir),
            request_timeout,
            port,
            dotenv_path: None,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// The Gemini client described by this config.
    pub fn gemini(&self) -> GeminiCompletion {
        GeminiCompletion::new(self.model.clone(), self.api_key.clone())
            .with_base_url(self.gemini_base_url.clone())
            .with_timeout(self.request_timeout)
    }

    /// Read both prompt templates from [`Self::prompts_dir`].
    pub fn templates(&self) -> PromptTemplates {
        PromptTemplates::load(&self.prompts_dir)
    }

    /// Wire the Gemini client, scenario store and templates together.
    pub fn build_orchestrator(&self) -> ChatOrchestrator {
        ChatOrchestrator::new(
            Arc::new(self.gemini()),
            ScenarioStore::new(self.scenarios_dir.clone()),
            self.templates(),
        )
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("scenarios_dir", &self.scenarios_dir)
            .field("prompts_dir", &self.prompts_dir)
            .field("request_timeout", &self.request_timeout)
            .field("port", &self.port)
            .field("dotenv_path", &self.dotenv_path)
            .finish()
    }
}
