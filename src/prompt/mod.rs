//! Prompt construction for the upstream model.
//!
//! Pure string assembly: the article summary frames the domain, the
//! snippet grounds the phrase, and the style block sets length and
//! register. The domain-inference instruction is what keeps answers from
//! degenerating into dictionary definitions.

use crate::types::{ContextWindow, Style};

/// Build the single instruction string sent to the model.
pub fn build_prompt(window: &ContextWindow, selected_text: &str, style: Style) -> String {
    let style_block = match style {
        Style::Simple => {
            "Explain it in 20 to 100 words for a curious non-expert. \
             Build the explanation around one concrete analogy."
        }
        Style::Technical => {
            "Explain it in at least 30 words for a practitioner in that domain. \
             Use the domain's own terminology and include implementation-level \
             detail where it clarifies the concept."
        }
    };

    format!(
        "You are explaining a phrase the reader highlighted on a web page.\n\
         \n\
         Article summary (use this to identify the domain):\n\
         {summary}\n\
         \n\
         Text surrounding the highlighted phrase:\n\
         {snippet}\n\
         \n\
         Highlighted phrase: \"{selected_text}\"\n\
         \n\
         First, silently infer the specific technical domain of this article \
         from the summary and surrounding text. Then explain what the phrase \
         means strictly within that domain. Do not give a generic dictionary \
         definition, and do not describe meanings the phrase has in other \
         fields.\n\
         \n\
         {style_block}",
        summary = window.summary,
        snippet = window.snippet,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ContextWindow {
        ContextWindow {
            snippet: "a mutex prevents concurrent access to shared state".into(),
            summary: "An article about operating systems.".into(),
        }
    }

    #[test]
    fn embeds_all_parts() {
        let prompt = build_prompt(&window(), "mutex", Style::Technical);
        assert!(prompt.contains("operating systems"));
        assert!(prompt.contains("prevents concurrent access"));
        assert!(prompt.contains("\"mutex\""));
        assert!(prompt.contains("infer the specific technical domain"));
        assert!(prompt.contains("dictionary"));
    }

    #[test]
    fn style_blocks_differ() {
        let simple = build_prompt(&window(), "mutex", Style::Simple);
        let technical = build_prompt(&window(), "mutex", Style::Technical);
        assert!(simple.contains("analogy"));
        assert!(technical.contains("at least 30 words"));
        assert_ne!(simple, technical);
    }
}
