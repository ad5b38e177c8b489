//! Most-recent-first search history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Deduplicated query history. Re-issuing a query moves it to the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore from persisted entries, most recent first. Duplicates and
    /// anything past capacity are dropped.
    #[must_use]
    pub fn from_entries(entries: Vec<String>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        for entry in entries.into_iter().rev() {
            history.push(entry);
        }
        history
    }

    /// Record a query. Returns `false` for blank input.
    pub fn push(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query.trim().is_empty() || self.capacity == 0 {
            return false;
        }
        if let Some(existing) = self.entries.iter().position(|entry| *entry == query) {
            self.entries.remove(existing);
        }
        self.entries.push_front(query);
        self.entries.truncate(self.capacity);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_query_is_deduplicated_at_front() {
        let mut history = SearchHistory::default();
        history.push("drain");
        history.push("faucet");
        history.push("drain");
        assert_eq!(history.to_vec(), vec!["drain", "faucet"]);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = SearchHistory::with_capacity(3);
        for query in ["a1", "b2", "c3", "d4"] {
            history.push(query);
        }
        assert_eq!(history.to_vec(), vec!["d4", "c3", "b2"]);
    }

    #[test]
    fn blank_queries_are_ignored() {
        let mut history = SearchHistory::default();
        assert!(!history.push("   "));
        assert!(history.is_empty());
    }

    #[test]
    fn from_entries_preserves_order_and_cap() {
        let stored = vec!["new".to_string(), "mid".to_string(), "new".to_string(), "old".to_string()];
        let history = SearchHistory::from_entries(stored, 2);
        assert_eq!(history.to_vec(), vec!["new", "mid"]);
    }
}
