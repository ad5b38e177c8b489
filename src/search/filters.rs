//! Category filters applied after scoring
//!
//! The active set defaults to `{"all"}`, which disables filtering. Selecting
//! any other filter replaces the set with that single tag.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::{Category, Guide};

/// The pass-everything filter tag.
pub const ALL: &str = "all";

/// Active category tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    active: BTreeSet<String>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterSet {
    /// The default set, `{"all"}`.
    #[must_use]
    pub fn all() -> Self {
        Self {
            active: BTreeSet::from([ALL.to_string()]),
        }
    }

    /// A set holding a single tag.
    #[must_use]
    pub fn only(filter: impl Into<String>) -> Self {
        let mut set = Self::all();
        set.select(filter);
        set
    }

    /// Build a set from several tags. An empty list or any `"all"` yields the
    /// default set.
    #[must_use]
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let active: BTreeSet<String> = tags
            .into_iter()
            .map(|tag| tag.into().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        if active.is_empty() || active.contains(ALL) {
            Self::all()
        } else {
            Self { active }
        }
    }

    /// Replace the set with `filter`.
    pub fn select(&mut self, filter: impl Into<String>) {
        let filter = filter.into().trim().to_lowercase();
        self.active.clear();
        if filter.is_empty() {
            self.active.insert(ALL.to_string());
        } else {
            self.active.insert(filter);
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.active.contains(ALL)
    }

    #[must_use]
    pub fn contains(&self, filter: &str) -> bool {
        self.active.contains(filter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    /// Whether `guide` passes the filter.
    ///
    /// Guides with an unknown category never pass a concrete filter. The
    /// `seasonal` tag also passes guides carrying the `seasonal` keyword.
    #[must_use]
    pub fn matches(&self, guide: &Guide) -> bool {
        if self.is_all() {
            return true;
        }
        self.active.iter().any(|filter| {
            (guide.category.is_known() && guide.category.as_str() == filter)
                || (filter == Category::Seasonal.as_str() && guide.has_keyword("seasonal"))
        })
    }
}

/// Document count for one selectable filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCount {
    pub filter: String,
    pub label: String,
    pub count: usize,
}

/// Count guides per known category, with `all` first.
///
/// Counts go by category only; the keyword rule of [`FilterSet::matches`]
/// does not inflate the `seasonal` count.
#[must_use]
pub fn filter_counts(guides: &[Guide]) -> Vec<FilterCount> {
    let mut counts = Vec::with_capacity(Category::KNOWN.len() + 1);
    counts.push(FilterCount {
        filter: ALL.to_string(),
        label: "All".to_string(),
        count: guides.len(),
    });
    for category in Category::KNOWN {
        let count = guides.iter().filter(|g| g.category == category).count();
        counts.push(FilterCount {
            filter: category.as_str().to_string(),
            label: category.label().to_string(),
            count,
        });
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Difficulty;

    fn guide(id: &str, category: Category, keywords: &[&str]) -> Guide {
        Guide {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            content: String::new(),
            category,
            difficulty: Difficulty::Easy,
            time_estimate: String::new(),
            tools: Vec::new(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn default_is_all() {
        let filters = FilterSet::default();
        assert!(filters.is_all());
        assert!(filters.matches(&guide("x", Category::Other("garage".into()), &[])));
    }

    #[test]
    fn select_replaces_with_singleton() {
        let mut filters = FilterSet::default();
        filters.select("Kitchen");
        assert!(!filters.is_all());
        assert_eq!(filters.iter().collect::<Vec<_>>(), vec!["kitchen"]);

        filters.select("bathroom");
        assert_eq!(filters.iter().collect::<Vec<_>>(), vec!["bathroom"]);

        filters.select("all");
        assert!(filters.is_all());
    }

    #[test]
    fn concrete_filter_matches_category_only() {
        let filters = FilterSet::only("kitchen");
        assert!(filters.matches(&guide("k", Category::Kitchen, &[])));
        assert!(!filters.matches(&guide("b", Category::Bathroom, &[])));
    }

    #[test]
    fn unknown_category_never_matches_concrete_filter() {
        let filters = FilterSet::only("garage");
        assert!(!filters.matches(&guide("g", Category::Other("garage".into()), &[])));
    }

    #[test]
    fn seasonal_filter_accepts_keyword() {
        let filters = FilterSet::only("seasonal");
        assert!(filters.matches(&guide("o", Category::Outdoor, &["Seasonal"])));
        assert!(filters.matches(&guide("s", Category::Seasonal, &[])));
        assert!(!filters.matches(&guide("k", Category::Kitchen, &["winter"])));
    }

    #[test]
    fn from_tags_collapses_all() {
        assert!(FilterSet::from_tags(Vec::<String>::new()).is_all());
        assert!(FilterSet::from_tags(["kitchen", "all"]).is_all());
        let set = FilterSet::from_tags(["kitchen", "bathroom"]);
        assert!(set.contains("kitchen") && set.contains("bathroom"));
        assert!(set.matches(&guide("b", Category::Bathroom, &[])));
    }

    #[test]
    fn counts_include_all_and_every_known_category() {
        let guides = vec![
            guide("k1", Category::Kitchen, &[]),
            guide("k2", Category::Kitchen, &[]),
            guide("o1", Category::Outdoor, &["seasonal"]),
            guide("x1", Category::Other("garage".into()), &[]),
        ];
        let counts = filter_counts(&guides);
        assert_eq!(counts.len(), 9);
        assert_eq!(counts[0].filter, "all");
        assert_eq!(counts[0].count, 4);

        let kitchen = counts.iter().find(|c| c.filter == "kitchen").unwrap();
        assert_eq!(kitchen.count, 2);
        let seasonal = counts.iter().find(|c| c.filter == "seasonal").unwrap();
        assert_eq!(seasonal.count, 0);
        let office = counts.iter().find(|c| c.filter == "office").unwrap();
        assert_eq!(office.label, "Home Office");
    }
}
