//! Speech-to-text for spoken questions.
//!
//! Audio bytes are forwarded to an OpenAI-compatible
//! `POST {llm.base_url}/audio/transcriptions` endpoint as a multipart form
//! (`file` + `model`). The same base URL and API key as the chat model are
//! used.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::config::{LlmConfig, TranscriptionConfig};

/// Turns recorded audio into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String>;
}

pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl WhisperClient {
    pub fn new(llm: &LlmConfig, transcription: &TranscriptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()?;
        let api_key = std::env::var(&llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            model: transcription.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let mut request = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Transcription API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_transcription(&json)
    }
}

fn parse_transcription(json: &serde_json::Value) -> Result<String> {
    json.get("text")
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| anyhow!("Invalid transcription response: missing text"))
}
