//! Response quality validation.
//!
//! Raw model output is accepted only if it looks like a complete
//! explanation in the requested style. Failures here are retried by the
//! orchestrator's output-budget ladder, not surfaced directly.

use tracing::debug;

use crate::types::Style;
use crate::{Result, ScholiaError};

/// Validate raw model output against the style's quality floor.
///
/// Rejects empty text, word counts outside the style's band, and a
/// trailing `..` (but not `...`) that signals a sentence cut off
/// mid-generation. A missing terminal punctuation mark is advisory only —
/// model punctuation varies too much to enforce it.
pub fn validate(text: &str, style: Style) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScholiaError::Validation("response was empty".to_string()));
    }

    let words = trimmed.split_whitespace().count();
    if words < style.min_words() {
        return Err(ScholiaError::Validation(format!(
            "{words} words is below the {} minimum of {}",
            style.as_str(),
            style.min_words()
        )));
    }
    if let Some(max) = style.max_words()
        && words > max
    {
        return Err(ScholiaError::Validation(format!(
            "{words} words exceeds the {} maximum of {max}",
            style.as_str()
        )));
    }

    if trimmed.ends_with("..") && !trimmed.ends_with("...") {
        return Err(ScholiaError::Validation(
            "response appears truncated mid-sentence".to_string(),
        ));
    }

    if !trimmed.ends_with(['.', '!', '?', '"', '\'', ')', ']', ':', '`']) {
        debug!(words, "response lacks terminal punctuation; accepting anyway");
    }

    Ok(trimmed.to_string())
}
