//! Shared application state

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{AppEvent, EventBus};
use crate::search::filters::ALL;
use crate::storage::Theme;

pub const HOME_PAGE: &str = "home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_theme: Theme,
    pub current_page: String,
    pub search_query: String,
    pub current_room: Option<String>,
    pub active_filters: Vec<String>,
    pub initialized: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_theme: Theme::Light,
            current_page: HOME_PAGE.to_string(),
            search_query: String::new(),
            current_room: None,
            active_filters: vec![ALL.to_string()],
            initialized: false,
        }
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub current_theme: Option<Theme>,
    pub current_page: Option<String>,
    pub search_query: Option<String>,
    pub current_room: Option<Option<String>>,
    pub active_filters: Option<Vec<String>>,
}

impl StatePatch {
    #[must_use]
    pub fn theme(theme: Theme) -> Self {
        Self {
            current_theme: Some(theme),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn page(page: impl Into<String>) -> Self {
        Self {
            current_page: Some(page.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filters(filters: Vec<String>) -> Self {
        Self {
            active_filters: Some(filters),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_room(mut self, room: Option<String>) -> Self {
        self.current_room = Some(room);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.current_page = Some(page.into());
        self
    }
}

/// Application state shared by every module. Updates announce the names of
/// the fields that actually changed.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<AppState>>,
    bus: EventBus,
}

impl SharedState {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self::with_state(bus, AppState::default())
    }

    #[must_use]
    pub fn with_state(bus: EventBus, state: AppState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
            bus,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.inner.read().clone()
    }

    /// Apply `patch`. Emits `APP_STATE_CHANGED` when anything changed and
    /// returns the changed field names.
    pub fn update(&self, patch: StatePatch) -> Vec<String> {
        let (changed, state) = {
            let mut state = self.inner.write();
            let mut changed = Vec::new();
            if let Some(theme) = patch.current_theme {
                if state.current_theme != theme {
                    state.current_theme = theme;
                    changed.push("currentTheme".to_string());
                }
            }
            if let Some(page) = patch.current_page {
                if state.current_page != page {
                    state.current_page = page;
                    changed.push("currentPage".to_string());
                }
            }
            if let Some(query) = patch.search_query {
                if state.search_query != query {
                    state.search_query = query;
                    changed.push("searchQuery".to_string());
                }
            }
            if let Some(room) = patch.current_room {
                if state.current_room != room {
                    state.current_room = room;
                    changed.push("currentRoom".to_string());
                }
            }
            if let Some(filters) = patch.active_filters {
                if state.active_filters != filters {
                    state.active_filters = filters;
                    changed.push("activeFilters".to_string());
                }
            }
            (changed, state.clone())
        };

        if !changed.is_empty() {
            debug!(changed = ?changed, "app state changed");
            self.bus.emit(AppEvent::AppStateChanged {
                changed: changed.clone(),
                state,
            });
        }
        changed
    }

    pub(crate) fn mark_initialized(&self) {
        self.inner.write().initialized = true;
    }
}
