//! HTML and plain-text sanitization for user-authored content.
//!
//! Wraps ammonia with the fixed policy used across blog posts, templates,
//! and public intake fields: a base tag set plus images and heading levels
//! 1-3, tag-scoped attributes, and http/https/mailto/data URL schemes.
//! Absent input is treated as an empty string.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::Builder;

/// Tags allowed in rich HTML content.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "div", "em", "h1", "h2", "h3", "hr", "i", "img", "li",
    "ol", "p", "pre", "span", "strong", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// URL schemes allowed in href/src attributes.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "data"];

static HTML_BUILDER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "name", "target", "rel"].into_iter().collect());
    tag_attributes.insert(
        "img",
        ["src", "alt", "title", "width", "height"].into_iter().collect(),
    );

    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .generic_attributes(["style"].into_iter().collect())
        .url_schemes(ALLOWED_SCHEMES.iter().copied().collect())
        // rel is attribute-allowlisted above, so ammonia must not manage it
        .link_rel(None);
    builder
});

static TEXT_BUILDER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(HashSet::new())
        .generic_attributes(HashSet::new());
    builder
});

/// Sanitize rich HTML content.
///
/// Strips disallowed tags and attributes, keeping the allowed base set plus
/// images and `h1`-`h3`. Script and style elements are removed entirely.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    HTML_BUILDER.clean(input).to_string()
}

/// Sanitize a plain-text field, stripping all tags and attributes.
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    TEXT_BUILDER.clean(input).to_string()
}

/// Sanitize an optional free-text field, mapping blank results to `None`.
#[must_use]
pub fn sanitize_optional_text(input: Option<&str>) -> Option<String> {
    let cleaned = sanitize_text(input.unwrap_or_default());
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_html_passes_through() {
        let input = "<p>hi <strong>there</strong></p>";
        assert_eq!(sanitize_html(input), input);
    }

    #[test]
    fn test_headings_one_through_three_allowed() {
        let input = "<h1>a</h1><h2>b</h2><h3>c</h3>";
        assert_eq!(sanitize_html(input), input);
        // h4 is outside the allowed range; the tag goes, the text stays
        assert_eq!(sanitize_html("<h4>d</h4>"), "d");
    }

    #[test]
    fn test_script_removed_entirely() {
        let out = sanitize_html("<p>ok</p><script>alert(1)</script>");
        assert_eq!(out, "<p>ok</p>");
    }

    #[test]
    fn test_anchor_attributes_scoped() {
        let out = sanitize_html(r#"<a href="https://example.com" onclick="x()">link</a>"#);
        assert!(out.contains(r#"href="https://example.com""#));
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn test_javascript_scheme_stripped() {
        let out = sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!out.contains("javascript"));
    }

    #[test]
    fn test_image_data_uri_allowed() {
        let input = r#"<img src="data:image/png;base64,iVBOR" alt="logo">"#;
        let out = sanitize_html(input);
        assert!(out.contains("data:image/png"));
        assert!(out.contains(r#"alt="logo""#));
    }

    #[test]
    fn test_sanitize_text_strips_everything() {
        assert_eq!(sanitize_text("<p>hello <b>world</b></p>"), "hello world");
        assert_eq!(sanitize_text("plain"), "plain");
    }

    #[test]
    fn test_sanitize_text_idempotent() {
        let once = sanitize_text("Tom &amp; Jerry <i>forever</i>");
        let twice = sanitize_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_html_idempotent_on_clean_input() {
        let once = sanitize_html("<p>hi</p><h2>sub</h2>");
        let twice = sanitize_html(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_optional_text_blank_becomes_none() {
        assert_eq!(sanitize_optional_text(None), None);
        assert_eq!(sanitize_optional_text(Some("  <b></b>  ")), None);
        assert_eq!(
            sanitize_optional_text(Some(" Acme <i>Inc</i> ")),
            Some("Acme Inc".to_owned())
        );
    }
}
