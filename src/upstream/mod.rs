//! Upstream AI backend abstraction.
//!
//! The orchestrator talks to the model through [`ExplanationBackend`],
//! keeping the wire client swappable (and mockable in tests). The shipped
//! implementation is [`ChatCompletionsClient`], which speaks the
//! chat-completions JSON shape.

mod chat;

pub use chat::ChatCompletionsClient;

use async_trait::async_trait;

use crate::Result;

/// Per-call parameters for one completion attempt.
///
/// `max_tokens` is the current rung of the output-budget ladder; the
/// orchestrator lowers it between attempts.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A backend that turns a prompt into generated text.
///
/// Credentials are passed per call: the service re-reads them from the
/// settings store at the start of every request and never caches them.
#[async_trait]
pub trait ExplanationBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Issue one completion call. No retry or timeout here — the
    /// orchestrator owns both.
    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
        options: &CompletionOptions,
    ) -> Result<String>;
}
