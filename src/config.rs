//! Configuration parsing and validation.
//!
//! Lectern is configured with a single TOML file. Every section and key has
//! a built-in default, so an empty file (or no file at all) yields a working
//! setup: local embeddings, Groq-hosted chat completions, and an HTTP server
//! on `127.0.0.1:5000`.
//!
//! # Example
//!
//! ```toml
//! [chunking]
//! max_words = 300
//!
//! [retrieval]
//! max_candidates = 20
//! max_results = 8
//!
//! [embedding]
//! provider = "ollama"
//! model = "nomic-embed-text"
//! dims = 768
//!
//! [llm]
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama-3.3-70b-versatile"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//! ```
//!
//! API keys are never read from the file, only from the environment
//! variable named by `llm.api_key_env` (and `OPENAI_API_KEY` for OpenAI
//! embeddings).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use lectern_core::chunk::DEFAULT_MAX_WORDS;
use lectern_core::retrieve::RetrieveParams;

/// Path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/lectern.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
        }
    }
}

fn default_max_words() -> usize {
    DEFAULT_MAX_WORDS
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Nearest neighbours requested before filtering to the selection.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Passages kept after filtering.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Kept passages that go into the answer prompt.
    #[serde(default = "default_context_passages")]
    pub context_passages: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            max_results: default_max_results(),
            context_passages: default_context_passages(),
        }
    }
}

impl RetrievalConfig {
    pub fn params(&self) -> RetrieveParams {
        RetrieveParams {
            max_candidates: self.max_candidates,
            max_results: self.max_results,
        }
    }
}

fn default_max_candidates() -> usize {
    20
}
fn default_max_results() -> usize {
    8
}
fn default_context_passages() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the `openai` and `ollama` providers.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_embedding_timeout_secs() -> u64 {
    30
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}

/// Generation settings and context budgets for ask, summarize and quiz.
#[derive(Debug, Deserialize, Clone)]
pub struct TasksConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_answer_max_tokens")]
    pub answer_max_tokens: u32,
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    #[serde(default = "default_quiz_max_tokens")]
    pub quiz_max_tokens: u32,
    #[serde(default = "default_summary_char_budget")]
    pub summary_char_budget: usize,
    #[serde(default = "default_quiz_char_budget")]
    pub quiz_char_budget: usize,
    #[serde(default = "default_quiz_target_questions")]
    pub quiz_target_questions: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            answer_max_tokens: default_answer_max_tokens(),
            summary_max_tokens: default_summary_max_tokens(),
            quiz_max_tokens: default_quiz_max_tokens(),
            summary_char_budget: default_summary_char_budget(),
            quiz_char_budget: default_quiz_char_budget(),
            quiz_target_questions: default_quiz_target_questions(),
        }
    }
}

fn default_temperature() -> f32 {
    0.3
}
fn default_answer_max_tokens() -> u32 {
    800
}
fn default_summary_max_tokens() -> u32 {
    800
}
fn default_quiz_max_tokens() -> u32 {
    1500
}
fn default_summary_char_budget() -> usize {
    10_000
}
fn default_quiz_char_budget() -> usize {
    12_000
}
fn default_quiz_target_questions() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_model")]
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_transcription_model(),
        }
    }
}

fn default_transcription_model() -> String {
    "whisper-large-v3".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Load and validate the configuration at `path`.
///
/// A missing file is not an error: the built-in defaults are used. A file
/// that exists but cannot be read or parsed is.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Resolve the config path from an optional CLI value.
pub fn config_path(cli: Option<PathBuf>) -> PathBuf {
    cli.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_words == 0 {
        bail!("chunking.max_words must be > 0");
    }

    let retrieval = &config.retrieval;
    if retrieval.max_results < 1 {
        bail!("retrieval.max_results must be >= 1");
    }
    if retrieval.max_candidates < retrieval.max_results {
        bail!(
            "retrieval.max_candidates ({}) must be >= retrieval.max_results ({})",
            retrieval.max_candidates,
            retrieval.max_results
        );
    }
    if retrieval.context_passages < 1 {
        bail!("retrieval.context_passages must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "local" => {}
        "openai" | "ollama" => {
            if config.embedding.model.is_none() {
                bail!(
                    "embedding.model must be specified when provider is '{}'",
                    config.embedding.provider
                );
            }
            if config.embedding.dims.unwrap_or(0) == 0 {
                bail!(
                    "embedding.dims must be > 0 when provider is '{}'",
                    config.embedding.provider
                );
            }
        }
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled, local, openai, or ollama.",
            other
        ),
    }
    if config.embedding.dims == Some(0) {
        bail!("embedding.dims must be > 0");
    }
    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be > 0");
    }

    let tasks = &config.tasks;
    if !(0.0..=2.0).contains(&tasks.temperature) {
        bail!("tasks.temperature must be in [0.0, 2.0]");
    }
    if tasks.summary_char_budget == 0 || tasks.quiz_char_budget == 0 {
        bail!("tasks.summary_char_budget and tasks.quiz_char_budget must be > 0");
    }
    if tasks.quiz_target_questions == 0 {
        bail!("tasks.quiz_target_questions must be > 0");
    }

    if config.llm.base_url.trim().is_empty() {
        bail!("llm.base_url must not be empty");
    }

    Ok(())
}
