use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    Claude,
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "claude" => Some(Provider::Claude),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Ollama, Provider::Claude, Provider::OpenAI]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama (Local)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::OpenAI => "ChatGPT (OpenAI)",
        }
    }

    /// Model used when the config doesn't name one
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "gemma3:latest",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }
}

/// Per-request options passed alongside the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub model: String,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

/// What a provider hands back. Providers don't agree on a shape, so a reply
/// is either plain text or whatever JSON the endpoint returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    Text(String),
    Structured(Value),
}

impl From<String> for ProviderReply {
    fn from(text: String) -> Self {
        ProviderReply::Text(text)
    }
}

impl From<&str> for ProviderReply {
    fn from(text: &str) -> Self {
        ProviderReply::Text(text.to_string())
    }
}

impl From<Value> for ProviderReply {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ProviderReply::Text(text),
            other => ProviderReply::Structured(other),
        }
    }
}

/// A chat completion endpoint. One prompt in, one reply out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<ProviderReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_round_trips_through_str() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str("gemini"), None);
    }

    #[test]
    fn test_json_string_becomes_text_reply() {
        assert_eq!(
            ProviderReply::from(json!("hello")),
            ProviderReply::Text("hello".to_string())
        );
        assert_eq!(
            ProviderReply::from(json!({"a": 1})),
            ProviderReply::Structured(json!({"a": 1}))
        );
    }
}
