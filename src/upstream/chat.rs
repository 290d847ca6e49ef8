//! Chat-completions wire client.
//!
//! Speaks the common `/v1/chat/completions` JSON shape: a single user
//! message carrying the prompt, `max_tokens` and `temperature` from the
//! current ladder rung, and the generated text read back from
//! `choices[0].message.content`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionOptions, ExplanationBackend};
use crate::{Result, ScholiaError};

/// Default upstream endpoint base.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Body substrings that identify an input-window overflow. Upstreams word
/// this differently, so match loosely.
const CONTEXT_OVERFLOW_MARKERS: &[&str] = &[
    "context_length",
    "context length",
    "maximum context",
    "too many tokens",
    "prompt is too long",
    "input is too long",
];

/// HTTP client for a chat-completions-style endpoint.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
}

impl ChatCompletionsClient {
    /// Create a client against the default endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock,
    /// or for OpenAI-compatible endpoints).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            // No client-level timeout: the orchestrator bounds each call
            // with its own wall-clock deadline.
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn map_failure(status: u16, retry_after: Option<Duration>, body: &str) -> ScholiaError {
        match status {
            401 | 403 => ScholiaError::AuthenticationFailed,
            429 => ScholiaError::RateLimited { retry_after },
            400 | 413 if is_context_overflow(body) => ScholiaError::ContextTooLarge,
            code => ScholiaError::Api {
                status: code,
                message: crate::extract::compact_ws(body),
            },
        }
    }
}

impl Default for ChatCompletionsClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_context_overflow(body: &str) -> bool {
    let lower = body.to_lowercase();
    CONTEXT_OVERFLOW_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

#[async_trait]
impl ExplanationBackend for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&ChatRequest {
                model: &options.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                max_tokens: options.max_tokens,
                temperature: options.temperature,
            })
            .send()
            .await
            .map_err(|e| ScholiaError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_failure(status.as_u16(), retry_after, &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScholiaError::Http(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ScholiaError::EmptyResponse);
        }
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
