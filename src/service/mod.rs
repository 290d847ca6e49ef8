//! Coordination entry point.
//!
//! [`ExplainService`] receives [`UiRequest`]s from the UI layer, drives
//! the pipeline (settings → cache → extraction → window → prompt →
//! dispatch → validation → cache store) and always answers with a
//! structured [`UiReply`] — no error ever crosses this boundary
//! unhandled.
//!
//! The service can be driven directly via [`ExplainService::handle`] or
//! over a channel via [`ExplainService::channel`], which drains requests
//! strictly in order on a single task — the cooperative single-lane
//! model the cache and limiter rely on.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::cache::{CacheConfig, ExplanationCache};
use crate::config::{Settings, SettingsStore};
use crate::extract;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::telemetry;
use crate::types::{ExplanationRequest, PageContext, Style, UiReply, UiRequest};
use crate::upstream::{ChatCompletionsClient, ExplanationBackend};
use crate::{Result, ScholiaError};

/// The page-extraction collaborator: reads the active page's HTML from
/// within the page's execution context.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn html(&self) -> Result<String>;
}

/// Main entry point for constructing the service.
pub struct Scholia;

impl Scholia {
    /// Create a new builder for configuring the service.
    pub fn builder() -> ScholiaBuilder {
        ScholiaBuilder::new()
    }
}

/// Builder for configuring [`ExplainService`] instances.
pub struct ScholiaBuilder {
    settings: Option<Arc<dyn SettingsStore>>,
    page: Option<Arc<dyn PageSource>>,
    backend: Option<Arc<dyn ExplanationBackend>>,
    api_base_url: Option<String>,
    cache_config: CacheConfig,
    orchestrator_config: OrchestratorConfig,
}

impl ScholiaBuilder {
    pub fn new() -> Self {
        Self {
            settings: None,
            page: None,
            backend: None,
            api_base_url: None,
            cache_config: CacheConfig::default(),
            orchestrator_config: OrchestratorConfig::default(),
        }
    }

    /// The external settings store (credential + model id). Required.
    pub fn settings(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(store);
        self
    }

    /// The page-extraction collaborator. Required.
    pub fn page_source(mut self, page: Arc<dyn PageSource>) -> Self {
        self.page = Some(page);
        self
    }

    /// Replace the upstream backend (defaults to [`ChatCompletionsClient`]).
    pub fn backend(mut self, backend: Arc<dyn ExplanationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Point the default backend at a different base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Override the explanation cache configuration.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Override the orchestrator configuration.
    pub fn orchestrator_config(mut self, config: OrchestratorConfig) -> Self {
        self.orchestrator_config = config;
        self
    }

    /// Build the service and spawn the cache sweeper.
    pub fn build(self) -> Result<ExplainService> {
        let settings = self.settings.ok_or_else(|| {
            ScholiaError::Configuration("a settings store is required".to_string())
        })?;
        let page = self.page.ok_or_else(|| {
            ScholiaError::Configuration("a page source is required".to_string())
        })?;

        let backend: Arc<dyn ExplanationBackend> = match (self.backend, self.api_base_url) {
            (Some(backend), _) => backend,
            (None, Some(url)) => Arc::new(ChatCompletionsClient::with_base_url(url)),
            (None, None) => Arc::new(ChatCompletionsClient::new()),
        };

        let cache = Arc::new(ExplanationCache::new(&self.cache_config));
        let sweeper = cache.spawn_sweeper(self.cache_config.sweep_interval);
        let orchestrator = Orchestrator::new(backend, self.orchestrator_config);

        Ok(ExplainService {
            settings,
            page,
            orchestrator,
            cache,
            _sweeper: sweeper,
        })
    }
}

impl Default for ScholiaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One queued request and where to send its reply.
pub struct RequestEnvelope {
    pub request: UiRequest,
    pub reply: oneshot::Sender<UiReply>,
}

/// Cloneable handle for submitting requests over the channel.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<RequestEnvelope>,
}

impl ServiceHandle {
    /// Submit an explanation request and await the structured reply.
    pub async fn explain(&self, selected_text: impl Into<String>, style: Style) -> UiReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = RequestEnvelope {
            request: UiRequest::GetExplanation {
                selected_text: selected_text.into(),
                style,
            },
            reply: reply_tx,
        };
        if self.tx.send(envelope).await.is_err() {
            return UiReply::Error {
                message: "The explanation service is not running.".to_string(),
            };
        }
        reply_rx.await.unwrap_or(UiReply::Error {
            message: "The explanation service stopped before replying.".to_string(),
        })
    }
}

/// The background coordination service.
pub struct ExplainService {
    settings: Arc<dyn SettingsStore>,
    page: Arc<dyn PageSource>,
    orchestrator: Orchestrator,
    cache: Arc<ExplanationCache>,
    _sweeper: tokio::task::JoinHandle<()>,
}

impl ExplainService {
    /// Handle one UI request, always producing a structured reply.
    pub async fn handle(&self, request: UiRequest) -> UiReply {
        match request {
            UiRequest::GetExplanation {
                selected_text,
                style,
            } => {
                let start = Instant::now();
                let result = self.explain(&selected_text, style).await;
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(telemetry::REQUESTS_TOTAL,
                    "style" => style.as_str(), "status" => status)
                .increment(1);
                metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
                    "style" => style.as_str())
                .record(start.elapsed().as_secs_f64());

                match result {
                    Ok((data, cached)) => UiReply::Success { data, cached },
                    Err(e) => UiReply::Error {
                        message: e.user_message(),
                    },
                }
            }
        }
    }

    /// Spawn the serving task and return a handle for submitting requests.
    ///
    /// Requests are drained strictly FIFO on one task; a second request for
    /// a key that is still in flight will miss the cache and dispatch again
    /// — an accepted simplification, not an at-most-once guarantee.
    pub fn channel(self: Arc<Self>, buffer: usize) -> (ServiceHandle, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<RequestEnvelope>(buffer);
        let task = tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let reply = self.handle(envelope.request).await;
                // A dropped receiver just means the UI gave up waiting.
                let _ = envelope.reply.send(reply);
            }
        });
        (ServiceHandle { tx }, task)
    }

    async fn explain(&self, selected_text: &str, style: Style) -> Result<(String, bool)> {
        // Input validation happens before any I/O, settings included.
        ExplanationRequest::validate_selection(selected_text)?;

        let settings = Settings::load(&*self.settings).await?;
        let request = ExplanationRequest::new(selected_text, style, settings.model.clone())?;

        if let Some(hit) = self
            .cache
            .get(&request.selected_text, style, &request.model)
            .await
        {
            debug!(style = style.as_str(), "explanation served from cache");
            return Ok((hit, true));
        }

        let html = self
            .page
            .html()
            .await
            .map_err(|e| ScholiaError::ContentExtraction(e.to_string()))?;
        let context = PageContext {
            raw_visible_text: extract::extract(&html),
        };
        if context.raw_visible_text == extract::NO_READABLE_CONTENT {
            return Err(ScholiaError::ContentExtraction(
                "the page produced no readable text".to_string(),
            ));
        }

        let text = self
            .orchestrator
            .explain(
                &context.raw_visible_text,
                &request.selected_text,
                style,
                &request.model,
                &settings.api_key,
            )
            .await?;

        self.cache
            .insert(&request.selected_text, style, &request.model, text.clone())
            .await;
        Ok((text, false))
    }
}
