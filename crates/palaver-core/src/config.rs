use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::DEFAULT_OLLAMA_URL;
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub default_model: Option<String>,
    pub ollama_url: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some("ollama".to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {:?}", config_path))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_default_model(model: &str) -> Result<()> {
        Self::save_default_model_to(&Self::get_config_path()?, model)
    }

    /// An existing file that fails to parse is an error and is left untouched
    pub fn save_default_model_to(config_path: &Path, model: &str) -> Result<()> {
        let mut config = Self::load_from(config_path)
            .context("Not saving the default model over an unreadable config file")?;
        config.default_model = Some(model.to_string());
        config.save_to(config_path)
    }

    /// Configured provider, falling back to Ollama for unknown names
    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or(Provider::Ollama)
    }

    /// The model identifier sent with every request
    pub fn model(&self) -> String {
        self.default_model
            .clone()
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    /// API keys: environment variables win over the config file
    pub fn claude_key(&self) -> Option<String> {
        std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .or_else(|| self.claude_api_key.clone())
    }

    pub fn openai_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .or_else(|| self.openai_api_key.clone())
    }

    /// Where the current provider's credentials come from: "local" for Ollama,
    /// otherwise "env", "config", or None when no key is set
    pub fn key_source(&self) -> Option<&'static str> {
        match self.provider() {
            Provider::Ollama => Some("local"),
            Provider::Claude => key_source("ANTHROPIC_API_KEY", &self.claude_api_key),
            Provider::OpenAI => key_source("OPENAI_API_KEY", &self.openai_api_key),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("palaver").join("config.json"))
    }
}

fn key_source(env_var: &str, stored: &Option<String>) -> Option<&'static str> {
    if std::env::var(env_var).is_ok() {
        Some("env")
    } else if stored.is_some() {
        Some("config")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.provider(), Provider::Ollama);
        assert_eq!(config.ollama_url(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("palaver").join("config.json");

        let config = Config {
            provider: Some("claude".to_string()),
            default_model: Some("claude-3-5-haiku-20241022".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider(), Provider::Claude);
        assert_eq!(loaded.model(), "claude-3-5-haiku-20241022");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider": "openai"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider(), Provider::OpenAI);
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.default_model, None);
    }

    #[test]
    fn test_unknown_provider_falls_back_to_ollama() {
        let config = Config {
            provider: Some("gemini".to_string()),
            ..Config::default()
        };
        assert_eq!(config.provider(), Provider::Ollama);
        assert_eq!(config.model(), "gemma3:latest");
    }

    #[test]
    fn test_save_default_model_keeps_other_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider": "claude", "claude_api_key": "sk-secret"}"#).unwrap();

        Config::save_default_model_to(&path, "claude-3-5-haiku-20241022").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider(), Provider::Claude);
        assert_eq!(loaded.claude_api_key.as_deref(), Some("sk-secret"));
        assert_eq!(loaded.default_model.as_deref(), Some("claude-3-5-haiku-20241022"));
    }

    #[test]
    fn test_save_default_model_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("palaver").join("config.json");

        Config::save_default_model_to(&path, "llama3.2").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider(), Provider::Ollama);
        assert_eq!(loaded.model(), "llama3.2");
    }

    #[test]
    fn test_save_default_model_leaves_invalid_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let broken = r#"{"provider":"claude","claude_api_key":"sk-secret",}"#;
        fs::write(&path, broken).unwrap();

        assert!(Config::save_default_model_to(&path, "x").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn test_malformed_file_is_err() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
