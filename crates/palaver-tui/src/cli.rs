use clap::{Parser, Subcommand};
use palaver_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(about = "Floating chat panel for local and hosted language models")]
#[command(version)]
pub struct Cli {
    /// AI provider to use (ollama, claude, openai)
    #[arg(short, long, env = "PALAVER_PROVIDER")]
    pub provider: Option<String>,

    /// Model identifier sent with every request
    #[arg(short, long, env = "PALAVER_MODEL")]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(long, env = "PALAVER_OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Remember --model as the default for next time
    #[arg(long, requires = "model")]
    pub save: bool,

    /// Write logs here instead of the cache directory
    #[arg(long, env = "PALAVER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// List models available from the provider
    Models,
}

impl Cli {
    /// Command-line flags win over the config file
    pub fn apply(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.provider = Some(provider.clone());
        }
        if let Some(model) = &self.model {
            config.default_model = Some(model.clone());
        }
        if let Some(url) = &self.ollama_url {
            config.ollama_url = Some(url.clone());
        }
    }
}
