//! Outbound request orchestration.
//!
//! The orchestrator owns every recovery concern on the path to the
//! upstream model: the single-lane rate limiter, the per-call timeout,
//! and two orthogonal retry ladders —
//!
//! - the **output-budget ladder**: one dispatch tries descending
//!   `max_tokens` rungs until a response survives validation;
//! - the **context-shrink policy**: when the upstream reports the input
//!   window overflowed, the snippet budget shrinks geometrically and the
//!   whole window/prompt/dispatch cycle is retried with exponential
//!   backoff. Transient transport failures retry on the same backoff
//!   without shrinking.
//!
//! Keeping the ladders separate keeps each independently testable.

mod limiter;

pub use limiter::{DispatchPermit, RateLimiter, DEFAULT_MIN_INTERVAL};

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::types::Style;
use crate::upstream::{CompletionOptions, ExplanationBackend};
use crate::{prompt, validate, window, Result, ScholiaError};

/// Configuration for retry behaviour on recoverable errors.
///
/// Uses exponential backoff: `initial_delay * 2^(attempt)`, capped at
/// `max_delay`. A provider `retry_after` hint takes precedence.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 1s.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Effective delay, respecting upstream `retry_after` hints.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Orchestrator tuning knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Descending `max_tokens` rungs tried within one dispatch.
    pub token_ladder: Vec<u32>,
    /// Wall-clock bound on each upstream call.
    pub request_timeout: Duration,
    /// Minimum interval between dispatches.
    pub min_interval: Duration,
    /// Backoff policy for the outer recovery loop.
    pub retry: RetryConfig,
    /// Base snippet budget in characters.
    pub snippet_budget: usize,
    /// Multiplicative snippet shrink applied per context-overflow failure.
    pub shrink_factor: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            token_ladder: vec![1024, 768, 512],
            request_timeout: Duration::from_secs(45),
            min_interval: DEFAULT_MIN_INTERVAL,
            retry: RetryConfig::default(),
            snippet_budget: window::SNIPPET_BASE_CHARS,
            shrink_factor: 0.2,
        }
    }
}

/// Drives upstream calls with rate limiting, timeouts, and recovery.
pub struct Orchestrator {
    backend: Arc<dyn ExplanationBackend>,
    limiter: RateLimiter,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ExplanationBackend>, config: OrchestratorConfig) -> Self {
        let limiter = RateLimiter::new(config.min_interval);
        Self {
            backend,
            limiter,
            config,
        }
    }

    /// Produce a validated explanation for `selected_text` in `page_text`.
    ///
    /// Runs the full window/prompt/dispatch cycle under the outer recovery
    /// policy: context overflows shrink the snippet budget, transient
    /// failures back off and retry, anything else is surfaced immediately.
    /// Exhausting the attempts yields [`ScholiaError::ExhaustedRetries`].
    pub async fn explain(
        &self,
        page_text: &str,
        selected_text: &str,
        style: Style,
        model: &str,
        api_key: &str,
    ) -> Result<String> {
        let mut snippet_budget = self.config.snippet_budget as f64;
        let mut last_err: Option<ScholiaError> = None;

        for attempt in 0..self.config.retry.max_attempts {
            let window = window::select_window(page_text, selected_text, snippet_budget as usize);
            let prompt = prompt::build_prompt(&window, selected_text, style);

            let (reason, err) = match self.dispatch(&prompt, style, model, api_key).await {
                Ok(text) => return Ok(text),
                Err(ScholiaError::ContextTooLarge) => {
                    snippet_budget *= self.config.shrink_factor;
                    ("context_too_large", ScholiaError::ContextTooLarge)
                }
                Err(e) if e.is_transient() => ("transient", e),
                Err(e) => return Err(e),
            };

            metrics::counter!(telemetry::RETRIES_TOTAL, "reason" => reason).increment(1);
            if attempt + 1 < self.config.retry.max_attempts {
                let delay = self.config.retry.effective_delay(attempt, err.retry_after());
                warn!(
                    attempt = attempt + 1,
                    max_attempts = self.config.retry.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    snippet_budget = snippet_budget as usize,
                    error = %err,
                    "retrying explanation after recoverable error"
                );
                tokio::time::sleep(delay).await;
            }
            last_err = Some(err);
        }

        Err(ScholiaError::ExhaustedRetries(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        ))
    }

    /// One rate-limited dispatch: walk the output-budget ladder until a
    /// response passes validation.
    ///
    /// The permit is held across all rungs, so the whole ladder counts as
    /// a single dispatch for rate-limiting purposes, and the completion
    /// timestamp is stamped on release even when every rung failed.
    pub async fn dispatch(
        &self,
        prompt: &str,
        style: Style,
        model: &str,
        api_key: &str,
    ) -> Result<String> {
        let _permit = self.limiter.acquire().await;

        let mut last_err: Option<ScholiaError> = None;
        for &max_tokens in &self.config.token_ladder {
            let options = CompletionOptions {
                model: model.to_string(),
                max_tokens,
                temperature: style.temperature(),
            };

            let call = self.backend.complete(prompt, api_key, &options);
            let outcome = match tokio::time::timeout(self.config.request_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ScholiaError::Timeout(self.config.request_timeout)),
            };

            match outcome.and_then(|text| validate::validate(&text, style)) {
                Ok(text) => return Ok(text),
                // Shrinking the output budget cannot fix an oversized
                // input or a rejected key; bail out of the ladder.
                Err(e @ ScholiaError::ContextTooLarge)
                | Err(e @ ScholiaError::AuthenticationFailed) => return Err(e),
                Err(e) => {
                    metrics::counter!(telemetry::LADDER_FAILURES_TOTAL).increment(1);
                    warn!(
                        backend = self.backend.name(),
                        max_tokens,
                        error = %e,
                        "ladder rung failed, degrading output budget"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ScholiaError::Configuration("token ladder is empty".to_string())
        }))
    }
}
