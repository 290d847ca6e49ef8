//! Explanation request types

use serde::{Deserialize, Serialize};

use crate::{Result, ScholiaError};

/// Selections at or beyond this length are rejected before any I/O.
pub const MAX_SELECTION_CHARS: usize = 1000;

/// Explanation verbosity/audience mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    /// Short, analogy-driven, for a non-expert reader.
    Simple,
    /// Domain terminology and implementation detail.
    Technical,
}

impl Style {
    /// Stable label used in cache keys and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Simple => "simple",
            Style::Technical => "technical",
        }
    }

    /// Sampling temperature for the upstream call.
    ///
    /// Technical answers want determinism; simple answers benefit from a
    /// little creative latitude for analogies.
    pub fn temperature(&self) -> f32 {
        match self {
            Style::Simple => 0.7,
            Style::Technical => 0.3,
        }
    }

    /// Minimum acceptable word count for a response in this style.
    pub fn min_words(&self) -> usize {
        match self {
            Style::Simple => 15,
            Style::Technical => 30,
        }
    }

    /// Maximum acceptable word count, if this style has a ceiling.
    pub fn max_words(&self) -> Option<usize> {
        match self {
            Style::Simple => Some(150),
            Style::Technical => None,
        }
    }
}

/// One user interaction: a highlighted phrase plus how to explain it.
///
/// Immutable once constructed; discarded when the request completes.
/// The model identifier is resolved from settings by the entry point,
/// not chosen by the UI layer.
#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    pub selected_text: String,
    pub style: Style,
    pub model: String,
}

impl ExplanationRequest {
    /// Validate and construct a request.
    pub fn new(
        selected_text: impl Into<String>,
        style: Style,
        model: impl Into<String>,
    ) -> Result<Self> {
        let selected_text = selected_text.into();
        Self::validate_selection(&selected_text)?;
        Ok(Self {
            selected_text,
            style,
            model: model.into(),
        })
    }

    /// Check a selection without constructing a request.
    ///
    /// Rejects empty/whitespace selections and selections at or over
    /// [`MAX_SELECTION_CHARS`] — both before any extraction or dispatch.
    pub fn validate_selection(selected_text: &str) -> Result<()> {
        if selected_text.trim().is_empty() {
            return Err(ScholiaError::InvalidInput(
                "Nothing is selected. Highlight some text first.".to_string(),
            ));
        }
        if selected_text.chars().count() >= MAX_SELECTION_CHARS {
            return Err(ScholiaError::InvalidInput(
                "The selection is too long to explain. Highlight a shorter phrase.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_selection() {
        assert!(ExplanationRequest::new("   ", Style::Simple, "m").is_err());
    }

    #[test]
    fn rejects_oversized_selection() {
        let long = "x".repeat(MAX_SELECTION_CHARS);
        assert!(ExplanationRequest::new(long, Style::Technical, "m").is_err());
    }

    #[test]
    fn accepts_just_under_limit() {
        let text = "x".repeat(MAX_SELECTION_CHARS - 1);
        assert!(ExplanationRequest::new(text, Style::Simple, "m").is_ok());
    }

    #[test]
    fn style_parameters() {
        assert_eq!(Style::Simple.temperature(), 0.7);
        assert_eq!(Style::Technical.temperature(), 0.3);
        assert_eq!(Style::Simple.max_words(), Some(150));
        assert_eq!(Style::Technical.max_words(), None);
    }
}
