//! Settings read from the external key-value store.
//!
//! The credential and model identifier live in an opaque store owned by
//! the settings UI. They are read fresh at the start of every explanation
//! request and never cached beyond that request's lifetime, so a key
//! changed in the settings UI takes effect on the very next request.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{Result, ScholiaError};

/// Store key for the API credential.
pub const SETTING_API_KEY: &str = "api_key";

/// Store key for the model identifier.
pub const SETTING_MODEL: &str = "model";

/// Provider keys are expected to start with this prefix.
pub const API_KEY_PREFIX: &str = "sk-";

/// The opaque external key-value store collaborator.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read one setting, `None` when unset.
    async fn get(&self, key: &str) -> Option<String>;
}

/// Settings resolved for a single request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
}

impl Settings {
    /// Load and validate settings for one request.
    ///
    /// Missing or malformed values are configuration errors: fatal, never
    /// retried, and surfaced to the user with remediation instructions.
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        let api_key = store
            .get(SETTING_API_KEY)
            .await
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ScholiaError::Configuration(
                    "No API key is configured. Open the extension settings and add one."
                        .to_string(),
                )
            })?;

        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(ScholiaError::Configuration(format!(
                "The configured API key does not look valid (expected it to start with \
                 \"{API_KEY_PREFIX}\"). Check the extension settings."
            )));
        }

        let model = store
            .get(SETTING_MODEL)
            .await
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                ScholiaError::Configuration(
                    "No model is configured. Pick a model in the extension settings.".to_string(),
                )
            })?;

        Ok(Self { api_key, model })
    }
}

/// Simple in-memory store, for tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_valid_settings() {
        let store = MemorySettings::new()
            .with(SETTING_API_KEY, "sk-test-123")
            .with(SETTING_MODEL, "gpt-4o-mini");
        let settings = Settings::load(&store).await.unwrap();
        assert_eq!(settings.api_key, "sk-test-123");
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn missing_key_is_configuration_error() {
        let store = MemorySettings::new().with(SETTING_MODEL, "gpt-4o-mini");
        let err = Settings::load(&store).await.unwrap_err();
        assert!(matches!(err, ScholiaError::Configuration(_)));
        assert!(err.user_message().contains("API key"));
    }

    #[tokio::test]
    async fn wrong_prefix_is_rejected() {
        let store = MemorySettings::new()
            .with(SETTING_API_KEY, "hf_not_a_provider_key")
            .with(SETTING_MODEL, "gpt-4o-mini");
        let err = Settings::load(&store).await.unwrap_err();
        assert!(matches!(err, ScholiaError::Configuration(_)));
    }

    #[tokio::test]
    async fn missing_model_is_configuration_error() {
        let store = MemorySettings::new().with(SETTING_API_KEY, "sk-test");
        let err = Settings::load(&store).await.unwrap_err();
        assert!(err.user_message().contains("model"));
    }
}
