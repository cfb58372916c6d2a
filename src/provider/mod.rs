//! Completion provider abstraction
//!
//! Adapts the relay's conversation model to a vendor completion API.
//! Handlers depend on the [`Provider`] trait rather than a concrete
//! client so tests can substitute stubs. One implementation exists:
//! [`GeminiClient`].

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Context label included in the prompt to bias the mentor persona.
pub const DEFAULT_CONTEXT: &str = "developer-mentor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One prior turn of the conversation, caller-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// A single completion request. Constructed per HTTP call, consumed once.
/// History is ordered oldest first and forwarded in that order.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub message: String,
    pub history: Vec<Message>,
    pub context: String,
}

impl CompletionRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Vec::new(),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// Events produced by a streaming completion.
///
/// The sequence is single-pass: deltas arrive as the network delivers
/// them, then either `Done` or `Error`. An `Error` may arrive before the
/// first delta (initialization failure) or mid-sequence (interruption);
/// consumers must stop and fall back in both cases.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    TextDelta(String),
    Error(String),
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,
    #[error("completion API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("completion API returned no text")]
    EmptyResponse,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name, reported in responses.
    fn name(&self) -> &'static str;

    /// Single-shot completion. No internal retry - fallback is the
    /// caller's responsibility.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Streaming completion. Fragments are yielded as they arrive from
    /// the network; the receiver ends after `Done` or `Error`.
    async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, ProviderError>;
}
