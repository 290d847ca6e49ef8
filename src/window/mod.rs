//! Context window selection around the highlighted phrase.
//!
//! [`select_window`] picks a bounded excerpt of the extracted page text
//! that surrounds the selected phrase, preferring whole sentences and
//! falling back to a character window when sentence matching fails. The
//! summary is computed independently from the head of the article and is
//! used by the prompt for domain identification.
//!
//! Everything here is pure and deterministic.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::truncate_chars;
use crate::types::ContextWindow;

/// Default snippet budget, in characters. The orchestrator passes smaller
/// budgets when recovering from a context-too-large failure.
pub const SNIPPET_BASE_CHARS: usize = 1500;

/// Cap on the independently computed article summary.
pub const SUMMARY_MAX_CHARS: usize = 400;

/// Sentences taken either side of the matching sentence.
const SENTENCES_AROUND: usize = 3;

/// Sentences used for the summary.
const SUMMARY_SENTENCES: usize = 4;

/// Character window either side of the phrase in the offset fallback.
const FALLBACK_WINDOW_CHARS: usize = 600;

/// Head of the text used when the phrase is absent entirely.
const HEAD_FALLBACK_CHARS: usize = 800;

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // A run of non-terminators ended by .!? (plus trailing quotes/brackets),
    // terminated by whitespace or end of input.
    Regex::new(r#"[^.!?]+[.!?]+["'”’)\]]*(\s+|$)"#).expect("sentence regex is valid")
});

/// Select the context window for a phrase within the extracted page text.
///
/// `snippet_budget` caps the snippet length in characters; the summary cap
/// is fixed at [`SUMMARY_MAX_CHARS`].
pub fn select_window(full_text: &str, selected_text: &str, snippet_budget: usize) -> ContextWindow {
    let sentences = split_sentences(full_text);
    let snippet = sentence_window(&sentences, selected_text)
        .unwrap_or_else(|| offset_window(full_text, selected_text));

    let summary = sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    ContextWindow {
        snippet: truncate_chars(snippet.trim(), snippet_budget),
        summary: truncate_chars(summary.trim(), SUMMARY_MAX_CHARS),
    }
}

/// Split into sentences on terminal punctuation; a trailing fragment with
/// no terminator still counts as a sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;
    for m in SENTENCE_RE.find_iter(text) {
        let s = text[m.start()..m.end()].trim();
        if !s.is_empty() {
            sentences.push(s);
        }
        last_end = m.end();
    }
    let tail = text[last_end..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// First sentence containing the phrase, with up to [`SENTENCES_AROUND`]
/// sentences either side, clamped to bounds.
fn sentence_window(sentences: &[&str], selected_text: &str) -> Option<String> {
    let needle = selected_text.to_lowercase();
    let hit = sentences
        .iter()
        .position(|s| s.to_lowercase().contains(&needle))?;
    let start = hit.saturating_sub(SENTENCES_AROUND);
    let end = (hit + SENTENCES_AROUND + 1).min(sentences.len());
    Some(sentences[start..end].join(" "))
}

/// Character-offset fallback: a fixed window either side of the first
/// case-insensitive occurrence, or the head of the text when absent.
fn offset_window(full_text: &str, selected_text: &str) -> String {
    let haystack: Vec<char> = full_text.chars().collect();
    let needle: Vec<char> = selected_text.chars().collect();

    match find_ci(&haystack, &needle) {
        Some(pos) => {
            let start = pos.saturating_sub(FALLBACK_WINDOW_CHARS);
            let end = (pos + needle.len() + FALLBACK_WINDOW_CHARS).min(haystack.len());
            haystack[start..end].iter().collect()
        }
        None => truncate_chars(full_text, HEAD_FALLBACK_CHARS),
    }
}

/// Case-insensitive substring search over chars. The inputs are already
/// capped at a couple of thousand characters, so quadratic worst case is
/// fine.
fn find_ci(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    'outer: for i in 0..=haystack.len() - needle.len() {
        for j in 0..needle.len() {
            let a = haystack[i + j];
            let b = needle[j];
            if !a.to_lowercase().eq(b.to_lowercase()) {
                continue 'outer;
            }
        }
        return Some(i);
    }
    None
}
