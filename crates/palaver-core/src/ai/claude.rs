use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::provider::{ChatOptions, ChatProvider, ProviderReply};

const CLAUDE_API_URL: &str = "https://api.anthropic.com";

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, CLAUDE_API_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn query(&self, model: &str, prompt: &str) -> Result<ProviderReply> {
        let request = ClaudeRequest {
            model,
            max_tokens: 4096,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Claude API error {}: {}", status, text));
        }

        let body: Value = response.json().await?;
        Ok(first_text_block(&body)
            .map(ProviderReply::Text)
            .unwrap_or(ProviderReply::Structured(body)))
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "claude-sonnet-4-20250514".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
            "claude-3-opus-20240229".to_string(),
        ]
    }
}

/// Pull the first `{"type": "text", "text": ...}` block out of a messages response
fn first_text_block(body: &Value) -> Option<String> {
    body.get("content")?
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str).unwrap_or("text") == "text")
        .find_map(|block| block.get("text").and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl ChatProvider for ClaudeClient {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply> {
        self.query(&options.model, prompt).await
    }
}
