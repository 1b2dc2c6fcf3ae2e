// HTML Sanitizer - strips active content from third-party article markup
// before it reaches a view that injects it as raw HTML.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use std::collections::HashSet;

static UNSAFE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s\x00-\x1f]*(?:javascript|vbscript)\s*:|^[\s\x00-\x1f]*data\s*:\s*text/html")
        .expect("valid unsafe url pattern")
});

/// Removes scripting elements, event-handler attributes and script URLs.
///
/// Everything else (structure, images, tables, classes) is preserved so the
/// article renders as the scraper delivered it.
#[derive(Debug, Clone)]
pub struct HtmlSanitizer {
    blocked_elements: HashSet<String>,
    blocked_attributes: HashSet<String>,
    url_attributes: HashSet<String>,
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        const BLOCKED_ELEMENTS: &[&str] = &[
            "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "base",
            "link", "meta", "noscript", "animate", "set", "animatetransform", "animatemotion",
        ];
        const BLOCKED_ATTRIBUTES: &[&str] = &["srcdoc", "formaction"];
        const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "xlink:href", "poster", "data"];
        Self {
            blocked_elements: BLOCKED_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            blocked_attributes: BLOCKED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            url_attributes: URL_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HtmlSanitizer {
    /// Remove elements passed into this method, along with their children.
    pub fn block_elements<D: ToString>(&mut self, elements: impl IntoIterator<Item = D>) {
        for element in elements {
            self.blocked_elements.insert(element.to_string().to_lowercase());
        }
    }

    pub fn sanitize(&self, html: &str) -> String {
        let mut document = Html::parse_fragment(html);

        let doomed: Vec<_> = document
            .tree
            .root()
            .descendants()
            .filter(|node| match node.value() {
                Node::Element(element) => self
                    .blocked_elements
                    .contains(&element.name().to_lowercase()),
                Node::Comment(_) => true,
                _ => false,
            })
            .map(|node| node.id())
            .collect();
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let elements: Vec<_> = document
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_element())
            .map(|node| node.id())
            .collect();
        for id in elements {
            if let Some(mut node) = document.tree.get_mut(id) {
                if let Node::Element(element) = node.value() {
                    element
                        .attrs
                        .retain(|name, value| self.keep_attribute(&name.local, value));
                }
            }
        }

        document.root_element().inner_html()
    }

    fn keep_attribute(&self, name: &str, value: &str) -> bool {
        let name = name.to_lowercase();
        if name.starts_with("on") || self.blocked_attributes.contains(&name) {
            return false;
        }
        if self.url_attributes.contains(&name) && UNSAFE_URL.is_match(&url_for_scheme(value)) {
            return false;
        }
        true
    }
}

/// Browsers drop tab, LF and CR anywhere in a URL and leading C0 controls or
/// spaces before reading the scheme; match against the same view.
fn url_for_scheme(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .trim_start_matches(|c: char| c <= ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_removed() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<p>Hello</p><script>alert("x")</script><p>World</p>"#;
        assert_eq!(sanitizer.sanitize(html), "<p>Hello</p><p>World</p>");
    }

    #[test]
    fn test_event_handlers_stripped() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<img src="https://example.com/a.png" onerror="alert(1)">"#;
        assert_eq!(
            sanitizer.sanitize(html),
            r#"<img src="https://example.com/a.png">"#
        );
    }

    #[test]
    fn test_javascript_links_neutralised() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<a href=" JavaScript:alert(1)">click</a><a href="https://example.com">ok</a>"#;
        assert_eq!(
            sanitizer.sanitize(html),
            r#"<a>click</a><a href="https://example.com">ok</a>"#
        );
    }

    #[test]
    fn test_scheme_split_by_whitespace_neutralised() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<a href="java&#x09;script:alert(1)">tab</a><a href="java&#x0A;script:alert(1)">lf</a><a href="&#x0D;vb&#x0D;script:x">cr</a>"#;
        assert_eq!(
            sanitizer.sanitize(html),
            "<a>tab</a><a>lf</a><a>cr</a>"
        );
    }

    #[test]
    fn test_leading_controls_before_data_url() {
        let sanitizer = HtmlSanitizer::default();
        let html = "<iframe></iframe><a href=\"\u{1} data:text/html,<b>x</b>\">d</a>";
        assert_eq!(sanitizer.sanitize(html), "<a>d</a>");
    }

    #[test]
    fn test_svg_animation_removed() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<svg><a><animate attributeName="href" values="javascript:alert(1)"/><set attributeName="href" to="javascript:alert(1)"/><animateTransform attributeName="transform"/><text>x</text></a></svg>"#;
        let sanitized = sanitizer.sanitize(html);
        assert!(!sanitized.contains("javascript"));
        assert!(!sanitized.to_lowercase().contains("animate"));
        assert!(!sanitized.contains("<set"));
        assert!(sanitized.contains("<text>x</text>"));
    }

    #[test]
    fn test_plain_markup_untouched() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<table class="w-full"><tbody><tr><td>1</td></tr></tbody></table>"#;
        assert_eq!(sanitizer.sanitize(html), html);
    }

    #[test]
    fn test_nested_iframe_and_comments_removed() {
        let sanitizer = HtmlSanitizer::default();
        let html = r#"<div><!-- tracking --><iframe src="https://ads.example"></iframe>text</div>"#;
        assert_eq!(sanitizer.sanitize(html), "<div>text</div>");
    }

    #[test]
    fn test_extra_blocked_elements() {
        let mut sanitizer = HtmlSanitizer::default();
        sanitizer.block_elements(["FORM"]);
        let html = r#"<p>a</p><form><input name="q"></form>"#;
        assert_eq!(sanitizer.sanitize(html), "<p>a</p>");
    }
}
