//! Text-completion provider trait.
//!
//! The language model is an external collaborator: the core hands it a
//! fully composed prompt and takes back plain text. Concrete clients live
//! in the `lectern` app crate.

use anyhow::Result;
use async_trait::async_trait;

/// Sampling settings for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Trait for text-completion backends.
///
/// Failures (network, rate limits, bad responses) are returned as errors
/// and must not be retried by the implementation.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Returns the model identifier (e.g. `"llama-3.3-70b-versatile"`).
    fn model_name(&self) -> &str;
    /// Complete `prompt` and return the generated text.
    async fn complete(&self, prompt: &str, settings: CompletionSettings) -> Result<String>;
}
