//! Scenario definitions and their flat-file store.
//!
//! A scenario lives in `{scenarios_dir}/{scenario_id}.json`. It is read once
//! per chat turn and never modified.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A role-play situation: who the model plays, in what setting, and how the
/// finished conversation is scored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub persona: String,
    pub context: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub culture_profile_used: Map<String, Value>,
    #[serde(default)]
    pub evaluation_rubric: Map<String, Value>,
    /// The file exactly as parsed, unknown keys and key order included.
    #[serde(skip)]
    document: Value,
}

impl Scenario {
    /// Build a scenario from a parsed JSON document, keeping the document.
    pub fn from_value(document: Value) -> Result<Self> {
        let mut scenario: Scenario = serde_json::from_value(document.clone())?;
        scenario.document = document;
        Ok(scenario)
    }

    /// Parse a scenario file's contents.
    pub fn from_json(raw: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// The scenario file as it was written.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Country for display, `"N/A"` when the scenario has none.
    pub fn country_or_default(&self) -> &str {
        self.country.as_deref().unwrap_or("N/A")
    }
}

/// Result of looking a scenario up by identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioLookup {
    Found(Scenario),
    /// No file exists at this path.
    Missing(PathBuf),
}

/// Reads scenarios from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    dir: PathBuf,
}

impl ScenarioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `scenario_id`.
    pub fn path_for(&self, scenario_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", scenario_id))
    }

    /// Load `scenario_id`.
    ///
    /// A missing file is a normal outcome ([`ScenarioLookup::Missing`]); an
    /// unreadable or malformed file is an error.
    pub async fn load(&self, scenario_id: &str) -> Result<ScenarioLookup> {
        let path = self.path_for(scenario_id);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(ScenarioLookup::Missing(path));
        }

        let raw = tokio::fs::read_to_string(&path).await?;
        let scenario = Scenario::from_json(&raw)?;
        tracing::debug!(scenario_id, title = %scenario.title, "loaded scenario");
        Ok(ScenarioLookup::Found(scenario))
    }
}
