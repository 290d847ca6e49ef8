//! Page-derived context types

/// Denoised visible text of the active page.
///
/// Derived fresh per request and owned by that request; never persisted.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub raw_visible_text: String,
}

/// Bounded excerpt of page text surrounding the highlighted phrase.
///
/// `snippet` contains the occurrence of the selected text when it was
/// found in the page; otherwise it falls back to the head of the text.
/// `summary` is an independent head-of-article excerpt used for domain
/// identification framing in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub snippet: String,
    pub summary: String,
}
