use scraper::{Html, Node};
use tracing::debug;

use crate::normalizer::cleaner;

/// Elements whose text content is never part of the readable output.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extract plain text from markup, preferring the HTML5 parser.
///
/// html5ever recovers from almost anything, so the regex stripper only takes
/// over when the parse reported errors *and* produced no text while the
/// regex pass still finds some.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let text = collect_text(&document);

    if text.trim().is_empty() && !document.errors.is_empty() {
        let fallback = cleaner::strip_tags(html);
        if !fallback.trim().is_empty() {
            debug!(
                parse_errors = document.errors.len(),
                "parser produced no text, using regex stripper"
            );
            return fallback;
        }
    }

    text
}

fn collect_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_joins_text_nodes() {
        let text = extract_text("<div><p>first</p><p>second</p></div>");
        assert_eq!(text, "first second");
    }

    #[test]
    fn test_extract_skips_script_and_style() {
        let html = r#"<html><head><style>body{color:red}</style></head><body><p>正文内容</p><script>alert('x')</script><noscript>enable js</noscript></body></html>"#;
        let text = extract_text(html);
        assert_eq!(text, "正文内容");
    }

    #[test]
    fn test_extract_decodes_entities() {
        let text = extract_text("<p>Hello&nbsp;World &amp; &#20013;&#x6587;</p>");
        assert_eq!(text, "Hello\u{00A0}World & 中文");
    }

    #[test]
    fn test_extract_skips_comments() {
        let text = extract_text("<p>shown</p><!-- hidden -->");
        assert_eq!(text, "shown");
    }

    #[test]
    fn test_extract_plain_text_passes_through() {
        assert_eq!(extract_text("没有任何标签的文本"), "没有任何标签的文本");
    }

    #[test]
    fn test_extract_malformed_markup_keeps_text() {
        let text = extract_text("<p>Unclosed tags<div>More content");
        assert!(text.contains("Unclosed tags"));
        assert!(text.contains("More content"));
    }
}
