//! Configuration loading, validation, and management for askpdf.
//!
//! Loads configuration from `~/.askpdf/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.
//! `.env` files are loaded by the binary before this runs, so variables
//! defined there are visible here like any other.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.askpdf/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat and embedding model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Vector store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Document ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentSettings,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("store", &self.store)
            .field("ingest", &self.ingest)
            .field("agent", &self.agent)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider label used in logs
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chat model driving the agent loop
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Embedding model for chunks and questions
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    1.0
}
fn default_embedding_model() -> String {
    "text-embedding-3-large".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: None,
            embedding_model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which vector store implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Qdrant,
    /// Process-local store, rebuilt from `ingest.pdf_path` when chat starts
    InMemory,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_url")]
    pub url: String,

    /// Qdrant API key, for hosted clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Chunks returned per retrieval
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("collection", &self.collection)
            .field("top_k", &self.top_k)
            .finish()
    }
}

fn default_store_url() -> String {
    "http://localhost:6333".into()
}
fn default_collection() -> String {
    "learning_langchain".into()
}
fn default_top_k() -> usize {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
            api_key: None,
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// The PDF to index. Relative paths resolve against the working directory.
    #[serde(default = "default_pdf_path")]
    pub pdf_path: PathBuf,

    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_pdf_path() -> PathBuf {
    PathBuf::from("react interview.pdf")
}
fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}
fn default_batch_size() -> usize {
    64
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            pdf_path: default_pdf_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model requests allowed per user turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    10
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location
    /// (`~/.askpdf/config.toml`) when `None`, then apply environment
    /// overrides:
    /// - `ASKPDF_API_KEY`, then `OPENAI_API_KEY`
    /// - `ASKPDF_MODEL`, `ASKPDF_API_URL`
    /// - `ASKPDF_QDRANT_URL`, `ASKPDF_COLLECTION`
    /// - `ASKPDF_PDF`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// The API key from the environment only fills a key missing from the
    /// file; every other override replaces the file value.
    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("ASKPDF_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"));
        }
        if let Some(model) = non_empty("ASKPDF_MODEL") {
            self.model.chat_model = model;
        }
        if let Some(url) = non_empty("ASKPDF_API_URL") {
            self.model.api_url = url;
        }
        if let Some(url) = non_empty("ASKPDF_QDRANT_URL") {
            self.store.url = url;
        }
        if let Some(collection) = non_empty("ASKPDF_COLLECTION") {
            self.store.collection = collection;
        }
        if let Some(pdf) = non_empty("ASKPDF_PDF") {
            self.ingest.pdf_path = PathBuf::from(pdf);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".askpdf")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.ingest.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "ingest.chunk_size must be > 0".into(),
            ));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }

        if self.ingest.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "ingest.batch_size must be > 0".into(),
            ));
        }

        if self.store.top_k == 0 {
            return Err(ConfigError::ValidationError("store.top_k must be > 0".into()));
        }

        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.collection must not be empty".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: ModelConfig::default(),
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
            agent: AgentSettings::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for askpdf_core::Error {
    fn from(e: ConfigError) -> Self {
        askpdf_core::Error::config(e.to_string())
    }
}
