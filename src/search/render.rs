//! Result and suggestion cards
//!
//! Cards are assembled from sanitizer-built elements only. Query matches
//! become `<mark>` children, so the host renders highlighting without ever
//! receiving raw markup. Cards carry `data-guide-id`, and the host reports
//! clicks on them straight back to the dispatcher.

use crate::core::{Category, Guide};
use crate::dom::Element;
use crate::security::Sanitizer;

use super::highlight::segments;

/// Material icon name shown next to a guide of `category`.
#[must_use]
pub fn room_icon(category: &Category) -> &'static str {
    match category {
        Category::Kitchen => "kitchen",
        Category::Bathroom => "bathtub",
        Category::Bedroom => "bed",
        Category::LivingRoom => "weekend",
        Category::Office => "computer",
        Category::Outdoor => "yard",
        Category::Emergency => "warning",
        _ => "build",
    }
}

/// Renders guides through a [`Sanitizer`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    sanitizer: &'a Sanitizer,
    mark_class: &'a str,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(sanitizer: &'a Sanitizer, mark_class: &'a str) -> Self {
        Self {
            sanitizer,
            mark_class,
        }
    }

    /// One `.search-result-item` card. `None` when the sanitizer refuses it.
    #[must_use]
    pub fn result_card(&self, guide: &Guide, query: &str) -> Option<Element> {
        let mut card = self.sanitizer.create_element(
            "div",
            &[("class", "search-result-item"), ("data-guide-id", &guide.id)],
            "",
        )?;
        card.append_child(self.icon("result-icon", &guide.category)?);

        let mut content = self.element("div", "result-content", "")?;
        content.append_child(self.marked("h3", "result-title", &guide.title, query)?);
        content.append_child(self.marked("p", "result-description", &guide.description, query)?);

        let mut meta = self.element("div", "result-meta", "")?;
        meta.append_child(self.element("span", "result-room", guide.category.as_str())?);
        meta.append_child(self.element(
            "span",
            &format!("result-difficulty {}", guide.difficulty),
            guide.difficulty.as_str(),
        )?);
        meta.append_child(self.element("span", "result-time", &guide.time_estimate)?);
        content.append_child(meta);

        let tools = if guide.tools.is_empty() {
            "None".to_string()
        } else {
            guide.tools.join(", ")
        };
        let mut tools_row = self.element("div", "result-tools", "")?;
        tools_row.append_child(self.element("span", "tools-label", "Tools needed:")?);
        tools_row.append_child(self.element("span", "tools-list", &tools)?);
        content.append_child(tools_row);
        card.append_child(content);

        let mut actions = self.element("div", "result-actions", "")?;
        actions.append_child(self.sanitizer.create_element(
            "button",
            &[("class", "view-guide-btn"), ("data-guide-id", &guide.id)],
            "View Guide",
        )?);
        card.append_child(actions);
        Some(card)
    }

    /// One `.search-suggestion` row.
    #[must_use]
    pub fn suggestion(&self, guide: &Guide, query: &str) -> Option<Element> {
        let mut row = self.sanitizer.create_element(
            "div",
            &[("class", "search-suggestion"), ("data-guide-id", &guide.id)],
            "",
        )?;
        row.append_child(self.icon("suggestion-icon", &guide.category)?);
        let mut content = self.element("div", "suggestion-content", "")?;
        content.append_child(self.marked("div", "suggestion-title", &guide.title, query)?);
        content.append_child(self.element(
            "div",
            "suggestion-meta",
            &format!("{} \u{2022} {}", guide.category, guide.difficulty),
        )?);
        row.append_child(content);
        Some(row)
    }

    /// Suggestion rows, or a single "no suggestions" placeholder.
    #[must_use]
    pub fn suggestions(&self, guides: &[&Guide], query: &str) -> Vec<Element> {
        if guides.is_empty() {
            return self
                .element("div", "no-suggestions", "No suggestions found")
                .into_iter()
                .collect();
        }
        guides
            .iter()
            .filter_map(|guide| self.suggestion(guide, query))
            .collect()
    }

    /// Result cards, or a single "no results" block.
    #[must_use]
    pub fn results(&self, guides: &[&Guide], query: &str) -> Vec<Element> {
        if guides.is_empty() {
            return self.no_results().into_iter().collect();
        }
        guides
            .iter()
            .filter_map(|guide| self.result_card(guide, query))
            .collect()
    }

    fn no_results(&self) -> Option<Element> {
        let mut block = self.element("div", "no-results", "")?;
        block.append_child(self.element("span", "material-icons", "search_off")?);
        block.append_child(self.sanitizer.create_element("h3", &[], "No results found")?);
        block.append_child(self.sanitizer.create_element(
            "p",
            &[],
            "Try different keywords or check your spelling",
        )?);
        Some(block)
    }

    fn icon(&self, class: &str, category: &Category) -> Option<Element> {
        let mut wrapper = self.element("div", class, "")?;
        wrapper.append_child(self.element("span", "material-icons", room_icon(category))?);
        Some(wrapper)
    }

    fn element(&self, tag: &str, class: &str, text: &str) -> Option<Element> {
        self.sanitizer.create_element(tag, &[("class", class)], text)
    }

    /// `text` split into plain `span` and `mark` children.
    fn marked(&self, tag: &str, class: &str, text: &str, query: &str) -> Option<Element> {
        let mut element = self.element(tag, class, "")?;
        for (segment, matched) in segments(text, query) {
            let child = if matched {
                self.element("mark", self.mark_class, segment)?
            } else {
                self.sanitizer.create_element("span", &[], segment)?
            };
            element.append_child(child);
        }
        Some(element)
    }
}
