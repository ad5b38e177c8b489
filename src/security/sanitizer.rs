//! Allow-list element builder and HTML sanitizer.
//!
//! Everything rendered from guide data passes through here. Tags outside the
//! allow-list are refused, attributes outside the per-tag and universal lists
//! are dropped, and values matching a dangerous pattern never reach output.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dom::{escape_attr, Element};
use crate::error::{GuideError, Result};

/// Replacement for a URL that failed the safety check.
pub const SAFE_URL_PLACEHOLDER: &str = "#";

const ALLOWED_TAGS: &[&str] = &[
    "div", "span", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "strong", "em", "b",
    "i", "u", "br", "hr", "img", "a", "button", "input", "textarea", "select", "option", "label",
    "form", "article", "section", "header", "footer", "nav", "main", "aside", "details", "summary",
    "mark",
];

/// Universal attributes. A trailing `*` matches a prefix family.
const UNIVERSAL_ATTRIBUTES: &[&str] = &["id", "class", "data-*", "aria-*", "role", "tabindex", "title"];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel"]),
    ("img", &["src", "alt", "width", "height"]),
    ("input", &["type", "name", "value", "placeholder", "required", "disabled"]),
    ("button", &["type", "disabled"]),
    ("form", &["action", "method"]),
    ("textarea", &["name", "placeholder", "rows", "cols", "required"]),
    ("select", &["name", "required", "multiple"]),
    ("option", &["value", "selected"]),
    ("details", &["open"]),
    ("label", &["for"]),
];

const SAFE_SCHEMES: &[&str] = &["http:", "https:", "mailto:", "tel:"];

/// Tags removed from markup together with everything inside them.
const STRIPPED_BLOCKS: &[&str] = &["script", "style", "iframe", "object", "embed"];

static DANGEROUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)data:text/html",
        r"(?i)on\w+\s*=",
        r"(?i)<script",
        r"(?i)<iframe",
        r"(?i)<object",
        r"(?i)<embed",
        r"(?i)<link",
        r"(?i)<meta",
        r"(?i)<style",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

static BLOCK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    STRIPPED_BLOCKS
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}\b.*?(?:</{tag}\s*>|\z)")).ok())
        .collect()
});

static TAG_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9-]*)([^>]*)>").ok());

static ATTR_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).ok()
});

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizerStats {
    pub allowed_tags: usize,
    pub allowed_attribute_sets: usize,
    pub dangerous_patterns: usize,
    pub blocked: u64,
}

/// Allow-list sanitizer.
#[derive(Debug)]
pub struct Sanitizer {
    tags: HashSet<&'static str>,
    tag_attributes: HashMap<&'static str, &'static [&'static str]>,
    blocked: AtomicU64,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: ALLOWED_TAGS.iter().copied().collect(),
            tag_attributes: TAG_ATTRIBUTES.iter().copied().collect(),
            blocked: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn is_allowed_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag.to_lowercase().as_str())
    }

    #[must_use]
    pub fn is_allowed_attribute(&self, tag: &str, attribute: &str) -> bool {
        let tag = tag.to_lowercase();
        let attribute = attribute.to_lowercase();
        let universal = UNIVERSAL_ATTRIBUTES.iter().any(|pattern| {
            pattern
                .strip_suffix('*')
                .map_or(*pattern == attribute, |prefix| attribute.starts_with(prefix))
        });
        universal
            || self
                .tag_attributes
                .get(tag.as_str())
                .is_some_and(|allowed| allowed.contains(&attribute.as_str()))
    }

    /// Whether `content` is free of every dangerous pattern.
    #[must_use]
    pub fn is_safe(&self, content: &str) -> bool {
        !DANGEROUS_PATTERNS.iter().any(|pattern| pattern.is_match(content))
    }

    /// Build an element from allow-listed parts. Returns `None` (and logs)
    /// when the tag is refused.
    #[must_use]
    pub fn create_element(&self, tag: &str, attributes: &[(&str, &str)], text: &str) -> Option<Element> {
        match self.try_create_element(tag, attributes, text) {
            Ok(element) => Some(element),
            Err(err) => {
                warn!(error = %err, "element creation refused");
                None
            }
        }
    }

    /// Build an element, failing with [`GuideError::RenderBlocked`] when the
    /// tag is outside the allow-list.
    pub fn try_create_element(
        &self,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<Element> {
        if !self.is_allowed_tag(tag) {
            self.blocked.fetch_add(1, Ordering::Relaxed);
            return Err(GuideError::RenderBlocked(format!("tag <{tag}> is not allowed")));
        }

        let mut element = Element::new(tag);
        for (name, value) in attributes {
            if !self.is_allowed_attribute(tag, name) {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                debug!(tag, attribute = *name, "dropping attribute outside allow-list");
                continue;
            }
            if let Some(value) = self.sanitize_attribute_value(name, value) {
                element = element.with_attr(*name, value);
            }
        }
        element.text = text.to_string();
        Ok(element)
    }

    /// Clean one attribute value. `None` means drop the attribute.
    ///
    /// `href`/`src` are never dropped: unsafe values become the `#`
    /// placeholder.
    #[must_use]
    pub fn sanitize_attribute_value(&self, name: &str, value: &str) -> Option<String> {
        let name = name.to_lowercase();
        let is_url = name == "href" || name == "src";

        if !self.is_safe(value) {
            self.blocked.fetch_add(1, Ordering::Relaxed);
            warn!(attribute = %name, "dangerous attribute value blocked");
            return is_url.then(|| SAFE_URL_PLACEHOLDER.to_string());
        }
        if is_url {
            return Some(self.sanitize_url(value));
        }
        if name.starts_with("data-") {
            return Some(sanitize_text(value));
        }
        Some(value.trim().to_string())
    }

    /// Pass relative, fragment and `http(s)`/`mailto`/`tel` URLs; anything
    /// else becomes `#`.
    #[must_use]
    pub fn sanitize_url(&self, url: &str) -> String {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        if ["/", "./", "../", "#"].iter().any(|prefix| trimmed.starts_with(prefix)) {
            return trimmed.to_string();
        }
        let lower = trimmed.to_ascii_lowercase();
        if SAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return trimmed.to_string();
        }
        self.blocked.fetch_add(1, Ordering::Relaxed);
        warn!(url = trimmed, "unsafe URL scheme blocked");
        SAFE_URL_PLACEHOLDER.to_string()
    }

    /// Sanitize raw markup against the allow-lists.
    ///
    /// Only allow-listed tags are emitted as markup. Any `<` or `>` outside
    /// them is escaped, so removing a tag can never splice a new one together.
    #[must_use]
    pub fn sanitize_html(&self, html: &str) -> String {
        let mut cleaned = html.to_string();
        for pattern in BLOCK_PATTERNS.iter() {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }

        let Some(tag_re) = TAG_RE.as_ref() else {
            return sanitize_text(&cleaned);
        };
        let mut out = String::with_capacity(cleaned.len());
        let mut last = 0;
        for caps in tag_re.captures_iter(&cleaned) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_escaped_brackets(&mut out, &cleaned[last..whole.start()]);
            last = whole.end();

            let tag = caps[2].to_lowercase();
            if !self.is_allowed_tag(&tag) {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                debug!(tag = %tag, "removing disallowed tag");
                continue;
            }
            if caps[1].is_empty() {
                let attrs = self.clean_attributes(&tag, &caps[3]);
                out.push_str(&format!("<{tag}{attrs}>"));
            } else {
                out.push_str(&format!("</{tag}>"));
            }
        }
        push_escaped_brackets(&mut out, &cleaned[last..]);
        out
    }

    fn clean_attributes(&self, tag: &str, raw: &str) -> String {
        let Some(attr_re) = ATTR_RE.as_ref() else {
            return String::new();
        };
        let mut out = String::new();
        for caps in attr_re.captures_iter(raw) {
            let name = caps[1].to_lowercase();
            if !self.is_allowed_attribute(tag, &name) {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str());
            match value {
                Some(value) => {
                    if let Some(clean) = self.sanitize_attribute_value(&name, value) {
                        out.push_str(&format!(" {name}=\"{}\"", escape_attr(&clean)));
                    }
                }
                None => {
                    out.push(' ');
                    out.push_str(&name);
                }
            }
        }
        out
    }

    #[must_use]
    pub fn stats(&self) -> SanitizerStats {
        SanitizerStats {
            allowed_tags: self.tags.len(),
            allowed_attribute_sets: self.tag_attributes.len() + 1,
            dangerous_patterns: DANGEROUS_PATTERNS.len(),
            blocked: self.blocked.load(Ordering::Relaxed),
        }
    }
}

fn push_escaped_brackets(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape `< > " ' /` for safe inclusion as text.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn img_javascript_src_is_rewritten() {
        let sanitizer = Sanitizer::new();
        let out = sanitizer.sanitize_html(r#"<img src="javascript:alert(1)">"#);
        assert_eq!(out, r##"<img src="#">"##);
        assert!(!out.to_lowercase().contains("javascript"));
    }

    #[test]
    fn create_element_rewrites_unsafe_src() {
        let sanitizer = Sanitizer::new();
        let el = sanitizer
            .create_element("img", &[("src", "javascript:alert(1)"), ("alt", "x")], "")
            .unwrap();
        assert_eq!(el.attr("src"), Some("#"));
        assert_eq!(el.attr("alt"), Some("x"));
    }

    #[test]
    fn create_element_refuses_disallowed_tags() {
        let sanitizer = Sanitizer::new();
        assert!(sanitizer.create_element("script", &[], "alert(1)").is_none());
        let err = sanitizer.try_create_element("iframe", &[], "").unwrap_err();
        assert!(matches!(err, GuideError::RenderBlocked(_)));
        assert!(sanitizer.stats().blocked >= 2);
    }

    #[test]
    fn create_element_filters_attributes() {
        let sanitizer = Sanitizer::new();
        let el = sanitizer
            .create_element(
                "button",
                &[
                    ("class", "view-guide-btn"),
                    ("data-guide-id", "k1"),
                    ("aria-label", "View"),
                    ("onclick", "steal()"),
                    ("href", "/x"),
                    ("title", "onload=boom()"),
                ],
                "View Guide",
            )
            .unwrap();
        assert_eq!(el.attr("class"), Some("view-guide-btn"));
        assert_eq!(el.data("guide-id"), Some("k1"));
        assert_eq!(el.attr("aria-label"), Some("View"));
        assert!(el.attr("onclick").is_none());
        assert!(el.attr("href").is_none(), "href is not allowed on button");
        assert!(el.attr("title").is_none(), "dangerous non-URL values are dropped");
    }

    #[test]
    fn sanitize_url_rules() {
        let sanitizer = Sanitizer::new();
        for ok in ["/guides/1", "./a", "../b", "#top", "https://x.test", "HTTP://x.test", "mailto:a@b.c", "tel:123"] {
            assert_eq!(sanitizer.sanitize_url(ok), ok.trim());
        }
        assert_eq!(sanitizer.sanitize_url("  /padded  "), "/padded");
        assert_eq!(sanitizer.sanitize_url("ftp://x"), "#");
        assert_eq!(sanitizer.sanitize_url("guides/relative"), "#");
        assert_eq!(sanitizer.sanitize_url(""), "");
    }

    #[test]
    fn sanitize_html_strips_blocks_with_content() {
        let sanitizer = Sanitizer::new();
        let out = sanitizer.sanitize_html(
            "<p>Hi<script>alert('x')</script> there</p><style>p{}</style><iframe src=\"x\"></iframe>",
        );
        assert_eq!(out, "<p>Hi there</p>");
    }

    #[test]
    fn sanitize_html_drops_unknown_tags_and_handlers() {
        let sanitizer = Sanitizer::new();
        let out = sanitizer.sanitize_html(
            r#"<div class="card" onclick="steal()"><blink>text</blink><a href="vbscript:x" target=_blank>go</a></div>"#,
        );
        assert_eq!(
            out,
            r##"<div class="card">text<a href="#" target="_blank">go</a></div>"##
        );
    }

    #[test]
    fn removed_tags_cannot_splice_a_script_tag() {
        let sanitizer = Sanitizer::new();
        let out = sanitizer.sanitize_html("<<x>script>alert(1)<</x>/script>");
        assert!(!out.to_lowercase().contains("<script"), "got {out}");
        assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt;");

        let out = sanitizer.sanitize_html("<scr<script>x</script>ipt>alert(1)</script>");
        assert!(!out.to_lowercase().contains("<script"), "got {out}");
    }

    #[test]
    fn stray_brackets_in_text_are_escaped() {
        let sanitizer = Sanitizer::new();
        assert_eq!(
            sanitizer.sanitize_html("<p>1 < 2 > 0</p>"),
            "<p>1 &lt; 2 &gt; 0</p>"
        );
    }

    #[test]
    fn sanitize_html_keeps_boolean_attributes() {
        let sanitizer = Sanitizer::new();
        let out = sanitizer.sanitize_html("<details open><summary>More</summary></details>");
        assert_eq!(out, "<details open><summary>More</summary></details>");
    }

    #[test]
    fn sanitize_text_escapes_markup() {
        assert_eq!(
            sanitize_text(r#"<a href="x">'/'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&#x2F;&#x27;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn is_safe_detects_patterns() {
        let sanitizer = Sanitizer::new();
        assert!(sanitizer.is_safe("Fix the drain"));
        assert!(!sanitizer.is_safe("<SCRIPT>"));
        assert!(!sanitizer.is_safe("onerror = x"));
        assert!(!sanitizer.is_safe("data:text/html;base64,AAAA"));
    }

    #[test]
    fn data_attributes_are_text_escaped() {
        let sanitizer = Sanitizer::new();
        assert_eq!(
            sanitizer.sanitize_attribute_value("data-note", "a/b"),
            Some("a&#x2F;b".to_string())
        );
    }
}
