//! Main-content extraction from page HTML.
//!
//! Given the raw HTML of the active page, [`extract`] returns a bounded,
//! denoised plain-text rendition of the main content. It prefers semantic
//! content containers, walks only the text nodes that are not inside
//! chrome (navigation, scripts, ads, editable widgets), collapses
//! whitespace, and truncates at [`MAX_PAGE_CHARS`].
//!
//! The function never fails: if nothing useful can be found it degrades
//! to the container's raw text and finally to [`NO_READABLE_CONTENT`].

use scraper::{ElementRef, Html, Selector};

/// Sentinel returned when the page yields no readable text at all.
pub const NO_READABLE_CONTENT: &str = "[no readable content]";

/// Hard cap on extracted page text, in characters.
pub const MAX_PAGE_CHARS: usize = 2000;

/// Containers tried in priority order before falling back to `body`.
const CONTAINER_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    ".post-content",
    ".article-content",
    ".entry-content",
    "#content",
    ".content",
];

/// Element names that never contribute visible prose.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "button", "select", "iframe", "svg",
];

/// Class/id tokens that mark chrome containers.
const NOISE_TOKENS: &[&str] = &[
    "nav",
    "navbar",
    "navigation",
    "menu",
    "sidebar",
    "side-bar",
    "ad",
    "ads",
    "advert",
    "advertisement",
    "banner",
    "promo",
    "cookie",
    "breadcrumb",
    "comments",
];

/// Extract the main visible text of a page.
///
/// Always returns a string; on total failure this is the
/// [`NO_READABLE_CONTENT`] sentinel, never an error.
pub fn extract(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(container) = pick_container(&document) else {
        return NO_READABLE_CONTENT.to_string();
    };

    let text = visible_text(container);
    if !text.is_empty() {
        return truncate_chars(&text, MAX_PAGE_CHARS);
    }

    // Denoised walk found nothing; fall back to the container's raw text
    // before declaring the page unreadable.
    let raw = compact_ws(&container.text().collect::<Vec<_>>().join(" "));
    if raw.is_empty() {
        NO_READABLE_CONTENT.to_string()
    } else {
        truncate_chars(&raw, MAX_PAGE_CHARS)
    }
}

/// First matching content container, else `body`, else the document root.
fn pick_container(document: &Html) -> Option<ElementRef<'_>> {
    for selector in CONTAINER_SELECTORS {
        if let Ok(sel) = Selector::parse(selector)
            && let Some(el) = document.select(&sel).next()
        {
            return Some(el);
        }
    }
    Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .or_else(|| Some(document.root_element()))
}

/// Concatenate the text nodes under `container` that are not inside noise.
fn visible_text(container: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let mut blocked = false;
        for ancestor in node.ancestors() {
            if ancestor.id() == container.id() {
                break;
            }
            if let Some(el) = ElementRef::wrap(ancestor)
                && is_noise_element(&el)
            {
                blocked = true;
                break;
            }
        }
        if !blocked {
            parts.push(&**text);
        }
    }
    compact_ws(&parts.join(" "))
}

fn is_noise_element(el: &ElementRef<'_>) -> bool {
    let element = el.value();
    if NOISE_TAGS.contains(&element.name()) {
        return true;
    }
    // contenteditable="" and contenteditable="true" both mean editable.
    if element
        .attr("contenteditable")
        .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    {
        return true;
    }
    for attr in ["class", "id"] {
        if let Some(value) = element.attr(attr) {
            for token in value.split_whitespace() {
                let token = token.to_ascii_lowercase();
                if NOISE_TOKENS.contains(&token.as_str())
                    || token.starts_with("ad-")
                    || token.starts_with("ads-")
                {
                    return true;
                }
            }
        }
    }
    false
}

/// Collapse all whitespace runs to single spaces.
pub(crate) fn compact_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate at a character count without splitting a code point.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_main_over_body() {
        let html = r#"<html><body>
            <nav>Home About Contact</nav>
            <main><p>The article body.</p></main>
            <footer>Copyright</footer>
        </body></html>"#;
        assert_eq!(extract(html), "The article body.");
    }

    #[test]
    fn strips_scripts_and_nav_inside_container() {
        let html = r#"<html><body><main>
            <script>var x = 1;</script>
            <nav>skip me</nav>
            <p>Keep this sentence.</p>
            <div class="sidebar">skip this too</div>
        </main></body></html>"#;
        assert_eq!(extract(html), "Keep this sentence.");
    }

    #[test]
    fn skips_editable_regions() {
        let html = r#"<html><body><main>
            <div contenteditable="true">draft text</div>
            <p>Published text.</p>
        </main></body></html>"#;
        assert_eq!(extract(html), "Published text.");
    }

    #[test]
    fn falls_back_to_body_without_semantic_container() {
        let html = "<html><body><p>Plain body text.</p></body></html>";
        assert_eq!(extract(html), "Plain body text.");
    }

    #[test]
    fn sentinel_for_empty_page() {
        assert_eq!(extract("<html><body></body></html>"), NO_READABLE_CONTENT);
    }

    #[test]
    fn caps_output_length() {
        let body = "word ".repeat(1000);
        let html = format!("<html><body><main><p>{body}</p></main></body></html>");
        let out = extract(&html);
        assert!(out.chars().count() <= MAX_PAGE_CHARS);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        let out = truncate_chars(s, 4);
        assert_eq!(out, "héll");
    }
}
