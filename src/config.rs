/// Configuration module for DocBuddy.
///
/// Handles loading settings from environment variables, providing defaults,
/// and validating them before any store or model call is attempted.
use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::GenerationParams;

// ── Default value functions ──────────────────────────────────────────

fn default_embedding_model() -> String {
    "models/embedding-001".to_string()
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_embedding_dimensions() -> usize {
    768
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_vector_store_path() -> String {
    "./chroma_db".to_string()
}

fn default_collection_name() -> String {
    "docbuddy_store".to_string()
}

fn default_retrieval_k() -> usize {
    5
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

// ── Errors ───────────────────────────────────────────────────────────

/// Configuration errors are fatal at startup; nothing runs without a
/// valid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY not found in environment variables")]
    MissingApiKey,

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0}")]
    OutOfRange(String),
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Gemini API credential. Required; validated as non-empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_vector_store_path")]
    pub vector_store_path: String,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            embedding_model: default_embedding_model(),
            llm_model: default_llm_model(),
            embedding_dimensions: default_embedding_dimensions(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            vector_store_path: default_vector_store_path(),
            collection_name: default_collection_name(),
            retrieval_k: default_retrieval_k(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            embedding_dimensions: env_parse("EMBEDDING_DIMENSIONS", defaults.embedding_dimensions)?,
            chunk_size: env_parse("CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_parse("CHUNK_OVERLAP", defaults.chunk_overlap)?,
            vector_store_path: env::var("VECTOR_STORE_PATH").unwrap_or(defaults.vector_store_path),
            collection_name: env::var("COLLECTION_NAME").unwrap_or(defaults.collection_name),
            retrieval_k: env_parse("RETRIEVAL_K", defaults.retrieval_k)?,
            default_temperature: env_parse("DEFAULT_TEMPERATURE", defaults.default_temperature)?,
            default_max_tokens: env_parse("DEFAULT_MAX_TOKENS", defaults.default_max_tokens)?,
        })
    }

    /// Validate configuration values. Called before touching the store or
    /// any remote model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::OutOfRange(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OutOfRange(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.retrieval_k == 0 {
            return Err(ConfigError::OutOfRange(
                "retrieval_k must be positive".to_string(),
            ));
        }
        if self.embedding_dimensions == 0 {
            return Err(ConfigError::OutOfRange(
                "embedding_dimensions must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(ConfigError::OutOfRange(format!(
                "default_temperature ({}) must be within [0.0, 1.0]",
                self.default_temperature
            )));
        }
        if !(100..=2000).contains(&self.default_max_tokens) {
            return Err(ConfigError::OutOfRange(format!(
                "default_max_tokens ({}) must be within [100, 2000]",
                self.default_max_tokens
            )));
        }
        Ok(())
    }

    /// Sampling defaults used when a query does not override them.
    #[must_use]
    pub fn generation_defaults(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.default_temperature,
            max_tokens: self.default_max_tokens,
        }
    }
}
