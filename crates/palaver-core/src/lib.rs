pub mod ai;
pub mod config;
pub mod draft;
pub mod exchange;
pub mod provider;
pub mod state;

// Re-export main types for convenience
pub use ai::{build_provider, list_models, ClaudeClient, OllamaClient, OpenAIClient};
pub use config::Config;
pub use draft::DraftInput;
pub use exchange::{normalize_reply, ExchangeController, ExchangeOutcome, FALLBACK_REPLY};
pub use provider::{ChatOptions, ChatProvider, Provider, ProviderReply};
pub use state::{ChatMessage, ChatRole, Transcript};
