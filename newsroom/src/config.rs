//! Model catalog and pipeline configuration.
//!
//! Model profiles are declared in a TOML catalog with a built-in fallback
//! compiled into the binary. API keys are referenced by environment variable
//! name and resolved when a client is built, never stored in the catalog and
//! never written back into the process environment.

use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_MODEL_CATALOG_PATH: &str = "newsroom/config/model-catalog.toml";
const BUILTIN_MODEL_CATALOG_TOML: &str = include_str!("../config/model-catalog.example.toml");

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("missing API key environment variable: {0}")]
    MissingApiKey(String),
    #[error("model catalog has no usable entries")]
    EmptyCatalog,
}

/// A single chat-completion endpoint the pipeline can talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub id: String,
    pub base_url: String,
    pub api_key_env: String,
    pub model: String,
}

impl ModelProfile {
    /// Resolve the API key from the environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .map_err(|_| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
struct ModelCatalog {
    default_model: Option<String>,
    #[serde(default)]
    models: HashMap<String, ModelCatalogEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
struct ModelCatalogEntry {
    base_url: Option<String>,
    api_key_env: Option<String>,
    model: Option<String>,
}

/// Registry of model profiles loaded from the catalog.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    profiles: HashMap<String, ModelProfile>,
    default_model: Option<String>,
}

impl ModelRegistry {
    /// Load from `NEWSROOM_MODEL_CATALOG` (or the default path), falling back
    /// to the built-in catalog when no file is readable.
    pub fn new() -> Self {
        load_catalog_file()
            .or_else(|| {
                tracing::warn!("Falling back to built-in model catalog");
                parse_catalog(BUILTIN_MODEL_CATALOG_TOML, "<built-in>")
            })
            .map(Self::from_catalog)
            .unwrap_or_else(|| {
                tracing::warn!("Built-in model catalog parse failed; registry will be empty");
                Self {
                    profiles: HashMap::new(),
                    default_model: None,
                }
            })
    }

    /// Build a registry directly from catalog TOML.
    pub fn from_toml_str(content: &str) -> Option<Self> {
        parse_catalog(content, "<inline>").map(Self::from_catalog)
    }

    fn from_catalog(catalog: ModelCatalog) -> Self {
        let mut profiles = HashMap::new();
        for (id, entry) in catalog.models {
            let (Some(base_url), Some(api_key_env), Some(model)) =
                (entry.base_url, entry.api_key_env, entry.model)
            else {
                tracing::warn!(model_id = %id, "Skipping incomplete model catalog entry");
                continue;
            };
            profiles.insert(
                id.clone(),
                ModelProfile {
                    id,
                    base_url,
                    api_key_env,
                    model,
                },
            );
        }
        Self {
            profiles,
            default_model: catalog.default_model,
        }
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelProfile> {
        self.profiles.get(model_id)
    }

    pub fn available_model_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.profiles.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve a profile: explicit request > `NEWSROOM_MODEL` env > catalog
    /// default > first available entry.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ModelProfile, ConfigError> {
        if let Some(requested) = requested {
            return self
                .get(requested)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownModel(requested.to_string()));
        }

        if let Ok(env_model) = std::env::var("NEWSROOM_MODEL") {
            if let Some(profile) = self.get(&env_model).cloned() {
                return Ok(profile);
            }
        }

        if let Some(default_model) = self.default_model.as_ref() {
            if let Some(profile) = self.get(default_model).cloned() {
                return Ok(profile);
            }
        }

        self.available_model_ids()
            .first()
            .and_then(|id| self.get(id).cloned())
            .ok_or(ConfigError::EmptyCatalog)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn load_catalog_file() -> Option<ModelCatalog> {
    let path = std::env::var("NEWSROOM_MODEL_CATALOG")
        .unwrap_or_else(|_| DEFAULT_MODEL_CATALOG_PATH.to_string());
    let content = std::fs::read_to_string(&path).ok()?;
    parse_catalog(&content, &path)
}

fn parse_catalog(content: &str, origin: &str) -> Option<ModelCatalog> {
    match toml::from_str(content) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            tracing::warn!(origin = %origin, error = %err, "Model catalog parse failed");
            None
        }
    }
}

// ============================================================================
// Pipeline tunables
// ============================================================================

/// What the supervisor does when the routing oracle cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleFailurePolicy {
    /// Stop the run. Matches the pipeline's original literal behavior: an
    /// unreachable oracle on the very first turn ends the run with no work
    /// done.
    #[default]
    Terminate,
    /// Ignore the oracle and route from completion flags alone, so a dead
    /// oracle still drives the pipeline to a report.
    RouteByState,
}

impl OracleFailurePolicy {
    /// Read `NEWSROOM_ORACLE_FAILURE` ("terminate" | "route_by_state").
    pub fn from_env() -> Self {
        match std::env::var("NEWSROOM_ORACLE_FAILURE") {
            Ok(value) => Self::from_wire(&value),
            Err(_) => Self::default(),
        }
    }

    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "route_by_state" | "route-by-state" => OracleFailurePolicy::RouteByState,
            _ => OracleFailurePolicy::Terminate,
        }
    }
}

/// Tunables for one driver instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Default node-execution budget for `submit` callers that take it.
    pub max_steps: usize,
    /// Per-request timeout for oracle and generation calls.
    pub request_timeout_ms: u64,
    pub oracle_failure: OracleFailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: 16,
            request_timeout_ms: 30_000,
            oracle_failure: OracleFailurePolicy::default(),
        }
    }
}
