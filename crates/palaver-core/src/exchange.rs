//! Drives one conversational turn at a time.
//!
//! A submission appends the user turn, marks the controller busy and hands
//! the prompt to the provider on a spawned task. The front end then calls
//! [`ExchangeController::poll`] from its event loop (or awaits
//! [`ExchangeController::settle`]) to record the reply. Every outcome goes
//! through the same settle step, which is the only place the busy flag is
//! cleared.

use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::draft::DraftInput;
use crate::provider::{ChatOptions, ChatProvider, ProviderReply};
use crate::state::{ChatMessage, Transcript};

/// Shown in place of a reply whenever the provider call fails, whatever the cause
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Fulfilled,
    Failed,
}

type PendingReply = JoinHandle<anyhow::Result<ProviderReply>>;

pub struct ExchangeController {
    provider: Arc<dyn ChatProvider>,
    options: ChatOptions,
    transcript: Transcript,
    draft: DraftInput,
    busy: bool,
    pending: Option<PendingReply>,
}

impl ExchangeController {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            options: ChatOptions::new(model),
            transcript: Transcript::new(),
            draft: DraftInput::new(),
            busy: false,
            pending: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &DraftInput {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftInput {
        &mut self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    /// Start an exchange. Returns false, changing nothing, when the text is
    /// blank or another exchange is still outstanding.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, draft_text: &str) -> bool {
        let prompt = draft_text.trim();
        if prompt.is_empty() {
            return false;
        }
        if self.busy {
            debug!("exchange already in flight, dropping submission");
            return false;
        }

        let prompt = prompt.to_string();
        self.transcript.append(ChatMessage::user(prompt.clone()));
        self.draft.clear();
        self.busy = true;

        debug!(
            model = %self.options.model,
            chars = prompt.chars().count(),
            "dispatching chat request"
        );

        let provider = Arc::clone(&self.provider);
        let options = self.options.clone();
        self.pending = Some(tokio::spawn(async move {
            provider.chat(&prompt, &options).await
        }));
        true
    }

    /// Submit whatever is in the draft input
    pub fn submit_draft(&mut self) -> bool {
        let text = self.draft.text().to_string();
        self.submit(&text)
    }

    /// Settle the outstanding exchange if the provider has answered.
    /// Never blocks; returns `None` while still waiting or when idle.
    pub fn poll(&mut self) -> Option<ExchangeOutcome> {
        let handle = self.pending.as_mut()?;
        if !handle.is_finished() {
            return None;
        }
        let joined = handle.now_or_never()?;
        self.pending = None;
        Some(self.finish(joined))
    }

    /// Wait for the outstanding exchange, if any, and settle it.
    pub async fn settle(&mut self) -> Option<ExchangeOutcome> {
        let handle = self.pending.as_mut()?;
        let joined = handle.await;
        self.pending = None;
        Some(self.finish(joined))
    }

    /// Submit and wait for the reply in one go
    pub async fn exchange(&mut self, text: &str) -> Option<ExchangeOutcome> {
        if !self.submit(text) {
            return None;
        }
        self.settle().await
    }

    fn finish(&mut self, joined: Result<anyhow::Result<ProviderReply>, JoinError>) -> ExchangeOutcome {
        let outcome = match joined {
            Ok(Ok(reply)) => {
                self.transcript
                    .append(ChatMessage::assistant(normalize_reply(reply)));
                ExchangeOutcome::Fulfilled
            }
            Ok(Err(err)) => {
                error!(error = ?err, "chat provider request failed");
                self.transcript.append(ChatMessage::assistant(FALLBACK_REPLY));
                ExchangeOutcome::Failed
            }
            Err(join_err) => {
                error!(error = %join_err, "chat provider task did not complete");
                self.transcript.append(ChatMessage::assistant(FALLBACK_REPLY));
                ExchangeOutcome::Failed
            }
        };

        self.busy = false;
        debug!(?outcome, turns = self.transcript.len(), "exchange settled");
        outcome
    }
}

impl Drop for ExchangeController {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Turn whatever the provider returned into the text of an assistant turn.
///
/// Plain text, or a structured reply that is just a JSON string, is used as
/// is. Other structured replies contribute their `message.content` string,
/// and anything else is shown as compact JSON.
/// The result is never empty: an empty selection falls back to the JSON
/// form of the whole reply.
pub fn normalize_reply(reply: ProviderReply) -> String {
    let content = match &reply {
        ProviderReply::Text(text) => Some(text.as_str()),
        ProviderReply::Structured(Value::String(text)) => Some(text.as_str()),
        ProviderReply::Structured(value) => value.pointer("/message/content").and_then(Value::as_str),
    };

    match content {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => match reply {
            ProviderReply::Text(text) => Value::String(text).to_string(),
            ProviderReply::Structured(value) => value.to_string(),
        },
    }
}
