//! Scholia - background explanation service for highlighted page text
//!
//! This crate is the coordination core behind a "highlight to explain"
//! browser add-on: it extracts the main content of the active page,
//! selects a context window around the highlighted phrase, builds a
//! domain-aware prompt, dispatches it upstream under a rate limiter with
//! layered retry/degradation policies, validates the response, and
//! memoizes results in a TTL cache. The on-page UI, overlay panel,
//! settings screen, and the upstream AI API are all external
//! collaborators reached through traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scholia::{MemorySettings, PageSource, Result, Scholia, Style};
//!
//! struct FixedPage(String);
//!
//! #[async_trait::async_trait]
//! impl PageSource for FixedPage {
//!     async fn html(&self) -> Result<String> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = MemorySettings::new()
//!         .with("api_key", "sk-your-key")
//!         .with("model", "gpt-4o-mini");
//!
//!     let service = Scholia::builder()
//!         .settings(Arc::new(settings))
//!         .page_source(Arc::new(FixedPage("<main>...</main>".into())))
//!         .build()?;
//!
//!     let (handle, _task) = Arc::new(service).channel(16);
//!     let reply = handle.explain("mutex", Style::Technical).await;
//!     println!("{reply:?}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod service;
pub mod telemetry;
pub mod types;
pub mod upstream;
pub mod validate;
pub mod window;

// Re-export main types at crate root
pub use cache::{CacheConfig, ExplanationCache};
pub use config::{MemorySettings, Settings, SettingsStore, SETTING_API_KEY, SETTING_MODEL};
pub use error::{Result, ScholiaError};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RateLimiter, RetryConfig};
pub use service::{
    ExplainService, PageSource, RequestEnvelope, Scholia, ScholiaBuilder, ServiceHandle,
};
pub use types::{ContextWindow, ExplanationRequest, PageContext, Style, UiReply, UiRequest};
pub use upstream::{ChatCompletionsClient, CompletionOptions, ExplanationBackend};
