//! Typed preferences over a [`KeyValueStore`]
//!
//! Values are stored as JSON under fixed keys. Reads fall back to defaults
//! on a missing or unreadable value; writes report success as a `bool` and
//! log a warning on failure, so a full or broken store never interrupts the
//! session.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::KeyValueStore;

pub const SEARCH_HISTORY_KEY: &str = "searchHistory";
pub const FAVORITES_KEY: &str = "favoriteGuides";
pub const PROGRESS_KEY: &str = "guideProgress";
pub const THEME_KEY: &str = "theme";
pub const ERROR_LOG_KEY: &str = "errorLog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guide id -> opened step numbers (1-based).
pub type GuideProgress = BTreeMap<String, BTreeSet<u32>>;

/// Typed access to persisted preferences.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read and decode a JSON value. Missing or undecodable values yield `None`.
    #[must_use]
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "could not read preference");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring unreadable preference");
                None
            }
        }
    }

    /// Encode and write a JSON value. Returns `false` on failure.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "could not encode preference");
                return false;
            }
        };
        match self.store.set(key, &raw) {
            Ok(()) => {
                debug!(key, bytes = raw.len(), "saved preference");
                true
            }
            Err(err) => {
                warn!(key, error = %err, "could not save preference");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "could not remove preference");
                false
            }
        }
    }

    #[must_use]
    pub fn search_history(&self) -> Vec<String> {
        self.get_json(SEARCH_HISTORY_KEY).unwrap_or_default()
    }

    pub fn set_search_history(&self, history: &[String]) -> bool {
        self.set_json(SEARCH_HISTORY_KEY, history)
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<String> {
        self.get_json(FAVORITES_KEY).unwrap_or_default()
    }

    pub fn set_favorites(&self, favorites: &[String]) -> bool {
        self.set_json(FAVORITES_KEY, favorites)
    }

    #[must_use]
    pub fn progress(&self) -> GuideProgress {
        self.get_json(PROGRESS_KEY).unwrap_or_default()
    }

    pub fn set_progress(&self, progress: &GuideProgress) -> bool {
        self.set_json(PROGRESS_KEY, progress)
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.get_json(THEME_KEY).unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> bool {
        self.set_json(THEME_KEY, &theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        (store, prefs)
    }

    #[test]
    fn defaults_when_empty() {
        let (_, prefs) = prefs();
        assert!(prefs.search_history().is_empty());
        assert!(prefs.favorites().is_empty());
        assert!(prefs.progress().is_empty());
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn values_roundtrip_through_store() {
        let (store, prefs) = prefs();
        assert!(prefs.set_theme(Theme::Dark));
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(prefs.theme(), Theme::Dark);

        let mut progress = GuideProgress::new();
        progress.entry("kitchen-001".into()).or_default().insert(2);
        assert!(prefs.set_progress(&progress));
        assert!(prefs.progress()["kitchen-001"].contains(&2));
    }

    #[test]
    fn corrupt_value_reads_as_default() {
        let (store, prefs) = prefs();
        store.set(SEARCH_HISTORY_KEY, "{not json").unwrap();
        assert!(prefs.search_history().is_empty());
    }

    #[test]
    fn full_store_write_returns_false() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let prefs = Preferences::new(store);
        let long: Vec<String> = (0..10).map(|i| format!("query number {i}")).collect();
        assert!(!prefs.set_search_history(&long));
        assert!(prefs.search_history().is_empty());
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
