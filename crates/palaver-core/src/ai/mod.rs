pub mod claude;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use anyhow::{anyhow, Result};

pub use claude::ClaudeClient;
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use openai::OpenAIClient;

use crate::config::Config;
use crate::provider::{ChatProvider, Provider};

/// Build the client for the configured provider.
pub fn build_provider(config: &Config) -> Result<Arc<dyn ChatProvider>> {
    match config.provider() {
        Provider::Ollama => Ok(Arc::new(OllamaClient::new(config.ollama_url()))),
        Provider::Claude => {
            let key = config.claude_key().ok_or_else(|| {
                anyhow!("Claude API key not configured. Set ANTHROPIC_API_KEY or claude_api_key in the config file")
            })?;
            Ok(Arc::new(ClaudeClient::new(&key)))
        }
        Provider::OpenAI => {
            let key = config.openai_key().ok_or_else(|| {
                anyhow!("OpenAI API key not configured. Set OPENAI_API_KEY or openai_api_key in the config file")
            })?;
            Ok(Arc::new(OpenAIClient::new(&key)))
        }
    }
}

/// Models the provider can be asked to use. Only Ollama needs a round trip.
pub async fn list_models(config: &Config) -> Result<Vec<String>> {
    match config.provider() {
        Provider::Ollama => OllamaClient::new(config.ollama_url()).list_models().await,
        Provider::Claude => Ok(ClaudeClient::list_models()),
        Provider::OpenAI => Ok(OpenAIClient::list_models()),
    }
}
