//! Scholia error types

use std::time::Duration;

/// Scholia error types
#[derive(Debug, thiserror::Error)]
pub enum ScholiaError {
    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// The prompt exceeded the model's input window. Triggers the
    /// context-shrink recovery path rather than failing immediately.
    #[error("input context too large for model")]
    ContextTooLarge,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty response from model")]
    EmptyResponse,

    /// Response text failed the style-dependent quality checks.
    /// Retried only via the output-token ladder within one dispatch.
    #[error("response failed validation: {0}")]
    Validation(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no readable content: {0}")]
    ContentExtraction(String),

    /// Every rung of every retry ladder was tried and failed.
    #[error("retries exhausted: {0}")]
    ExhaustedRetries(String),
}

impl ScholiaError {
    /// Whether this error is worth retrying with backoff.
    ///
    /// Transient errors cover the network edge (timeouts, rate limits,
    /// upstream 5xx) and soft response problems. Configuration and input
    /// errors are permanent: retrying cannot change the outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            ScholiaError::Http(_)
            | ScholiaError::RateLimited { .. }
            | ScholiaError::Timeout(_)
            | ScholiaError::EmptyResponse => true,
            ScholiaError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Retry-after hint from a rate-limit response, if the upstream sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ScholiaError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Actionable, user-facing message for this failure.
    ///
    /// The UI layer shows these verbatim, so each maps a failure class to
    /// what the user can actually do about it rather than a generic
    /// "something went wrong".
    pub fn user_message(&self) -> String {
        match self {
            ScholiaError::Configuration(msg) => msg.clone(),
            ScholiaError::AuthenticationFailed => {
                "The API key was rejected. Check the key in the extension settings.".to_string()
            }
            ScholiaError::ContentExtraction(_) => {
                "No readable text was found on this page. Try a different page.".to_string()
            }
            ScholiaError::InvalidInput(msg) => msg.clone(),
            ScholiaError::RateLimited { .. } => {
                "The AI service is rate limiting requests. Wait a moment and try again.".to_string()
            }
            ScholiaError::Timeout(_) | ScholiaError::Http(_) => {
                "Connection to the AI service was lost. Check your network and try again."
                    .to_string()
            }
            ScholiaError::ExhaustedRetries(_) => {
                "The AI service did not return a usable explanation after several attempts. \
                 Try again in a moment."
                    .to_string()
            }
            other => format!("Explanation failed: {other}"),
        }
    }
}

/// Result type alias for Scholia operations
pub type Result<T> = std::result::Result<T, ScholiaError>;
