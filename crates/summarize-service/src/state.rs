use anyhow::{Context, Result};

use crate::config::{ServiceConfig, DEFAULT_MODEL};
use crate::engine::Engine;

pub const BUNDLED_DATASET: &str = include_str!("../data/hosts_dataset.json");

/// Shared, immutable state behind every route.
pub struct AppState {
    pub engine: Engine,
    /// Configured chat model, reported by `/health` in every mode.
    pub model: String,
    pub dataset: String,
    pub allowed_origins: Vec<String>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        let defaults = ServiceConfig::default();
        Self {
            engine,
            model: DEFAULT_MODEL.to_string(),
            dataset: BUNDLED_DATASET.to_string(),
            allowed_origins: defaults.allowed_origins,
            body_limit: defaults.body_limit,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let dataset = match &config.sample_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read sample dataset {}", path.display()))?,
            None => BUNDLED_DATASET.to_string(),
        };
        Ok(Self {
            engine: Engine::from_settings(&config.ai, config.mock_delay),
            model: config.ai.model.clone(),
            dataset,
            allowed_origins: config.allowed_origins.clone(),
            body_limit: config.body_limit,
        })
    }
}
