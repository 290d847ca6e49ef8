//! Tests for the request orchestrator: output-budget ladder, context
//! shrink, rate limiting, timeout, and terminal failures.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use std::sync::Arc;

use scholia::orchestrator::{Orchestrator, OrchestratorConfig, RetryConfig};
use scholia::upstream::{CompletionOptions, ExplanationBackend};
use scholia::{Result, ScholiaError, Style};

const KEY: &str = "sk-test";
const MODEL: &str = "test-model";

fn technical_answer() -> String {
    let mut s = vec!["term"; 40].join(" ");
    s.push('.');
    s
}

fn page_text() -> String {
    // Long sentences so the 7-sentence window comfortably exceeds the
    // post-shrink snippet budget.
    let filler = "This padding sentence discusses scheduler behaviour, interrupt latency \
                  and page-table walks in the virtual memory subsystem. ";
    let mut text = filler.repeat(10);
    text.push_str("In this kernel a mutex prevents concurrent access to shared state. ");
    text.push_str(&filler.repeat(10));
    text
}

#[derive(Debug)]
struct Call {
    max_tokens: u32,
    prompt_chars: usize,
    started: Instant,
}

/// Backend that replays a scripted sequence of outcomes and records
/// every call it sees.
struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    fn new(script: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.calls.lock().unwrap())
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExplanationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &str,
        _api_key: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(Call {
            max_tokens: options.max_tokens,
            prompt_chars: prompt.chars().count(),
            started: Instant::now(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ScholiaError::EmptyResponse))
    }
}

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        min_interval: Duration::from_millis(1),
        retry: RetryConfig::new()
            .max_attempts(3)
            .initial_delay(Duration::from_millis(1)),
        ..OrchestratorConfig::default()
    }
}

#[tokio::test]
async fn ladder_degrades_until_success() {
    let backend = ScriptedBackend::new(vec![
        Err(ScholiaError::Api {
            status: 500,
            message: "boom".into(),
        }),
        Err(ScholiaError::Api {
            status: 502,
            message: "boom".into(),
        }),
        Ok(technical_answer()),
    ]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let result = orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await;

    assert!(result.is_ok());
    let calls = backend.calls();
    let budgets: Vec<u32> = calls.iter().map(|c| c.max_tokens).collect();
    assert_eq!(budgets, vec![1024, 768, 512]);
}

#[tokio::test]
async fn ladder_stops_at_first_success() {
    let backend = ScriptedBackend::new(vec![
        Err(ScholiaError::Http("reset".into())),
        Ok(technical_answer()),
    ]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let result = orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.call_count(), 2); // 1024 failed, 768 succeeded, 512 untouched
}

#[tokio::test]
async fn validation_failure_advances_the_ladder() {
    // First rung returns a response that is too short for Technical.
    let backend = ScriptedBackend::new(vec![
        Ok("too short.".to_string()),
        Ok(technical_answer()),
    ]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let result = orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn exhausted_ladder_surfaces_last_error() {
    let backend = ScriptedBackend::new(vec![
        Err(ScholiaError::Http("a".into())),
        Err(ScholiaError::Http("b".into())),
        Err(ScholiaError::Http("c".into())),
    ]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let err = orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, ScholiaError::Http(_)));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn auth_failure_short_circuits_the_ladder() {
    let backend = ScriptedBackend::new(vec![Err(ScholiaError::AuthenticationFailed)]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let err = orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, ScholiaError::AuthenticationFailed));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn context_overflow_shrinks_and_retries() {
    let backend = ScriptedBackend::new(vec![
        Err(ScholiaError::ContextTooLarge),
        Ok(technical_answer()),
    ]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let text = page_text();
    let result = orchestrator
        .explain(&text, "mutex", Style::Technical, MODEL, KEY)
        .await;

    assert!(result.is_ok());
    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    // The retry rebuilt the prompt from a 5x smaller snippet budget.
    assert!(calls[1].prompt_chars < calls[0].prompt_chars);
}

#[tokio::test]
async fn transient_errors_retry_then_exhaust() {
    let backend = ScriptedBackend::new(vec![
        Err(ScholiaError::RateLimited { retry_after: None }),
        Err(ScholiaError::RateLimited { retry_after: None }),
        Err(ScholiaError::RateLimited { retry_after: None }),
    ]);
    let config = OrchestratorConfig {
        token_ladder: vec![512], // single rung isolates the outer policy
        ..fast_config()
    };
    let orchestrator = Orchestrator::new(backend.clone(), config);

    let text = page_text();
    let err = orchestrator
        .explain(&text, "mutex", Style::Technical, MODEL, KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, ScholiaError::ExhaustedRetries(_)));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn permanent_errors_are_not_retried_by_the_outer_policy() {
    let backend = ScriptedBackend::new(vec![Err(ScholiaError::AuthenticationFailed)]);
    let orchestrator = Orchestrator::new(backend.clone(), fast_config());

    let text = page_text();
    let err = orchestrator
        .explain(&text, "mutex", Style::Technical, MODEL, KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, ScholiaError::AuthenticationFailed));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn dispatches_respect_the_minimum_interval() {
    let backend = ScriptedBackend::new(vec![Ok(technical_answer()), Ok(technical_answer())]);
    let config = OrchestratorConfig {
        min_interval: Duration::from_millis(100),
        ..fast_config()
    };
    let orchestrator = Orchestrator::new(backend.clone(), config);

    let first_done;
    {
        orchestrator
            .dispatch("prompt", Style::Technical, MODEL, KEY)
            .await
            .unwrap();
        first_done = Instant::now();
    }
    orchestrator
        .dispatch("prompt", Style::Technical, MODEL, KEY)
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    // Second dispatch must start >= min_interval after the first completed.
    assert!(calls[1].started.duration_since(first_done) >= Duration::from_millis(90));
}

/// Backend that never answers within the deadline.
struct StallingBackend;

#[async_trait]
impl ExplanationBackend for StallingBackend {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn complete(
        &self,
        _prompt: &str,
        _api_key: &str,
        _options: &CompletionOptions,
    ) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("never reached".to_string())
    }
}

#[tokio::test]
async fn slow_upstream_times_out_and_exhausts() {
    let config = OrchestratorConfig {
        token_ladder: vec![512],
        request_timeout: Duration::from_millis(20),
        retry: RetryConfig::new()
            .max_attempts(2)
            .initial_delay(Duration::from_millis(1)),
        min_interval: Duration::from_millis(1),
        ..OrchestratorConfig::default()
    };
    let orchestrator = Orchestrator::new(Arc::new(StallingBackend), config);

    let text = page_text();
    let err = orchestrator
        .explain(&text, "mutex", Style::Technical, MODEL, KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, ScholiaError::ExhaustedRetries(_)));
    assert!(err.to_string().contains("timed out"));
}
