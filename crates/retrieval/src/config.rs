//! Retrieval tuning configuration.
//!
//! Every constant of the answering pipeline lives here with its default.
//! Values are read from `.sanad/retrieval.yaml` when the file exists.

use sanad_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tuning knobs for search, scoring, lookup and delegation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Collections kept after ranking
    pub top_k: usize,

    /// Keywords extracted from a query
    pub max_keywords: usize,

    /// Record cap for text, keyword and phrase strategies
    pub strategy_limit: usize,

    /// Record cap for the sample fallback
    pub sample_limit: usize,

    /// Score added when a field contains the whole query
    pub full_match_weight: f64,

    /// Score added per query word a field contains
    pub word_match_weight: f64,

    /// Minimum lookup confidence for a hit
    pub lookup_threshold: f64,

    /// Minimum per-token similarity counted by the fuzzy matcher
    pub fuzzy_token_threshold: f64,

    /// Conversation turns forwarded to the remote model
    pub history_turns: usize,

    /// Sampling temperature for the remote model
    pub temperature: f32,

    /// Completion token cap for the remote model
    pub max_tokens: u32,

    /// Deadline for one remote completion
    pub remote_timeout_secs: u64,

    /// Deadline for one store call
    pub store_timeout_secs: u64,

    /// Field holding the record identifier in ingested documents
    pub id_field: String,

    /// Prompt definition used for the system message
    pub prompt_id: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_keywords: 5,
            strategy_limit: 5,
            sample_limit: 3,
            full_match_weight: 10.0,
            word_match_weight: 2.0,
            lookup_threshold: 0.3,
            fuzzy_token_threshold: 0.75,
            history_turns: 6,
            temperature: 0.7,
            max_tokens: 500,
            remote_timeout_secs: 30,
            store_timeout_secs: 10,
            id_field: "_id".to_string(),
            prompt_id: sanad_prompt::DEFAULT_ANSWER_PROMPT_ID.to_string(),
        }
    }
}

impl RetrievalConfig {
    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.strategy_limit == 0 || self.sample_limit == 0 {
            return Err(AppError::Config(
                "strategy_limit and sample_limit must be at least 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.lookup_threshold) {
            return Err(AppError::Config(format!(
                "lookup_threshold must be within [0, 1], got {}",
                self.lookup_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.fuzzy_token_threshold) {
            return Err(AppError::Config(format!(
                "fuzzy_token_threshold must be within [0, 1], got {}",
                self.fuzzy_token_threshold
            )));
        }

        if self.id_field.is_empty() {
            return Err(AppError::Config("id_field cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Load retrieval configuration.
///
/// Loads from `.sanad/retrieval.yaml` if it exists, otherwise returns the
/// defaults.
pub fn load_config(workspace: &Path) -> AppResult<RetrievalConfig> {
    let config_path = get_config_path(workspace);

    if !config_path.exists() {
        tracing::debug!("Using default retrieval config (no config file found)");
        return Ok(RetrievalConfig::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let config: RetrievalConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;

    config.validate()?;

    tracing::debug!("Loaded retrieval config from {:?}", config_path);
    Ok(config)
}

/// Save retrieval configuration.
pub fn save_config(workspace: &Path, config: &RetrievalConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    Ok(())
}

/// Get the path to the retrieval config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".sanad").join("retrieval.yaml")
}
