//! OpenAI-compatible chat completion client.
//!
//! Sends the composed prompt as a single user message to
//! `POST {llm.base_url}/chat/completions` and returns the content of the
//! first choice. Works against Groq, OpenAI, or any server that speaks the
//! same wire format. The API key is read from the environment variable
//! named by `llm.api_key_env`.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use lectern_core::completion::{CompletionSettings, Completer};

use crate::config::LlmConfig;

pub struct ChatCompletionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    /// Build a client from configuration.
    ///
    /// A missing API key is not an error here; requests simply go out
    /// unauthenticated, which local OpenAI-compatible servers accept.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Completer for ChatCompletionClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, settings: CompletionSettings) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": settings.max_tokens,
            "temperature": settings.temperature,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Chat completion API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content` from a chat completion response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid chat completion response: missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "Paris." } }
            ]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Paris.");
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        let json = serde_json::json!({ "choices": [] });
        assert!(parse_chat_response(&json).is_err());
        let json = serde_json::json!({ "error": { "message": "rate limited" } });
        assert!(parse_chat_response(&json).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = LlmConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            api_key_env: "LECTERN_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        let client = ChatCompletionClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model_name(), "llama-3.3-70b-versatile");
    }
}
