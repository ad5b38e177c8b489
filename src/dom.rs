//! Host-neutral element model.
//!
//! The host reports event targets as [`Element`] values (target first, then
//! its ancestors) and the sanitizer hands back [`Element`] trees to render.
//! Only the simple selectors the dispatcher needs are supported: a tag name,
//! `#id`, `.class` and `[attr]` / `[attr=value]`, optionally compounded
//! (`button.view-guide-btn[data-guide-id]`).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{GuideError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let merged = match self.attributes.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attributes.insert("class".to_string(), merged);
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Shorthand for a `data-*` attribute.
    #[must_use]
    pub fn with_data(self, key: &str, value: impl Into<String>) -> Self {
        self.with_attr(format!("data-{key}"), value)
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn append_child(&mut self, child: Self) {
        self.children.push(child);
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{key}"))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }

    /// Test this element against a simple selector.
    pub fn matches(&self, selector: &str) -> Result<bool> {
        let parsed = Selector::parse(selector)?;
        Ok(parsed.matches(self))
    }

    /// Serialize to HTML. Text and attribute values are escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
        if is_void(&self.tag) {
            out.push('>');
            return;
        }
        out.push('>');
        out.push_str(&escape_text(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Find the first element of `path` (target first) matching `selector`.
pub fn closest<'a>(path: &'a [Element], selector: &str) -> Result<Option<&'a Element>> {
    let parsed = Selector::parse(selector)?;
    Ok(path.iter().find(|element| parsed.matches(element)))
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    fn parse(raw: &str) -> Result<Self> {
        let selector = raw.trim();
        if selector.is_empty() {
            return Err(GuideError::Validation("empty selector".to_string()));
        }
        if selector.contains(char::is_whitespace) || selector.contains(',') {
            return Err(GuideError::Validation(format!(
                "unsupported selector {selector:?}: only simple selectors are allowed"
            )));
        }

        let mut parsed = Self::default();
        let mut rest = selector;

        let tag_len = rest
            .find(|c: char| matches!(c, '#' | '.' | '['))
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if !is_ident(tag) {
                return Err(invalid(selector));
            }
            parsed.tag = Some(tag.to_lowercase());
            rest = &rest[tag_len..];
        }

        while let Some(marker) = rest.chars().next() {
            rest = &rest[marker.len_utf8()..];
            match marker {
                '#' | '.' => {
                    let len = rest
                        .find(|c: char| matches!(c, '#' | '.' | '['))
                        .unwrap_or(rest.len());
                    let name = &rest[..len];
                    if !is_ident(name) {
                        return Err(invalid(selector));
                    }
                    if marker == '#' {
                        parsed.id = Some(name.to_string());
                    } else {
                        parsed.classes.push(name.to_string());
                    }
                    rest = &rest[len..];
                }
                '[' => {
                    let close = rest.find(']').ok_or_else(|| invalid(selector))?;
                    let body = &rest[..close];
                    let (name, value) = match body.split_once('=') {
                        Some((name, value)) => (
                            name,
                            Some(value.trim_matches(|c| c == '"' || c == '\'').to_string()),
                        ),
                        None => (body, None),
                    };
                    if !is_ident(name) {
                        return Err(invalid(selector));
                    }
                    parsed.attributes.push((name.to_lowercase(), value));
                    rest = &rest[close + 1..];
                }
                _ => return Err(invalid(selector)),
            }
        }

        Ok(parsed)
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| {
            match (element.attr(name), expected) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn invalid(selector: &str) -> GuideError {
    GuideError::Validation(format!("malformed selector {selector:?}"))
}
