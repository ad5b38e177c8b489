//! Search module: binds the query engine to the event bus
//!
//! Reacts to `SEARCH_QUERY_CHANGED` (already debounced by the dispatcher),
//! `FILTER_SELECTED` and `ESCAPE_PRESSED`. Every accepted query renders the
//! top suggestions and results, lands in the persisted history and is
//! announced with `SEARCH_RESULTS_READY`.

use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::app::{SharedState, StatePatch};
use crate::bootstrap::{AppModule, Integration};
use crate::config::SearchConfig;
use crate::core::Guide;
use crate::dom::Element;
use crate::events::{AppEvent, EventBus, EventKind, Subscription};
use crate::security::Sanitizer;
use crate::storage::Preferences;

use super::filters::{filter_counts, FilterCount, FilterSet};
use super::history::SearchHistory;
use super::index::SearchIndex;
use super::render::Renderer;

/// What the search panel currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub query: String,
    pub total: usize,
    pub suggestion_ids: Vec<String>,
    pub result_ids: Vec<String>,
    #[serde(skip)]
    pub suggestions: Vec<Element>,
    #[serde(skip)]
    pub results: Vec<Element>,
    pub suggestions_visible: bool,
    pub results_visible: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Metrics {
    total_searches: u64,
    average_response_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total_searches: u64,
    pub average_response_ms: f64,
    pub total_indexed_items: usize,
    pub index_size: usize,
    pub total_guides: usize,
    pub history_size: usize,
    pub active_filters: usize,
}

#[derive(Debug, Default)]
struct Session {
    filters: FilterSet,
    view: SearchView,
}

#[derive(Debug)]
pub struct SearchSystem {
    index: RwLock<SearchIndex>,
    sanitizer: Arc<Sanitizer>,
    prefs: Preferences,
    config: SearchConfig,
    bus: EventBus,
    shared: SharedState,
    history: Mutex<SearchHistory>,
    session: Mutex<Session>,
    metrics: Mutex<Metrics>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SearchSystem {
    pub fn new(
        guides: Vec<Guide>,
        sanitizer: Arc<Sanitizer>,
        prefs: Preferences,
        config: SearchConfig,
        bus: EventBus,
        shared: SharedState,
    ) -> Self {
        let index = SearchIndex::build(guides);
        info!(
            guides = index.guides().len(),
            terms = index.token_count(),
            "search index built"
        );
        let history = SearchHistory::from_entries(prefs.search_history(), config.history_capacity);
        Self {
            index: RwLock::new(index),
            sanitizer,
            prefs,
            config,
            bus,
            shared,
            history: Mutex::new(history),
            session: Mutex::new(Session::default()),
            metrics: Mutex::new(Metrics::default()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Run `query` as typed into the search box.
    ///
    /// Surrounding whitespace is ignored. Queries shorter than the configured
    /// minimum hide the panel and return `None`.
    pub fn handle_query(&self, query: &str) -> Option<SearchView> {
        let started = Instant::now();
        let query = query.trim();
        if query.chars().count() < self.config.min_query_len {
            self.hide(query);
            return None;
        }

        let filters = self.session.lock().filters.clone();
        let view = self.run(query, &filters);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        {
            let mut metrics = self.metrics.lock();
            metrics.total_searches += 1;
            metrics.average_response_ms = (metrics.average_response_ms + elapsed_ms) / 2.0;
        }
        self.remember(query);
        debug!(query, total = view.total, elapsed_ms, "search");

        self.session.lock().view = view.clone();
        self.shared.update(StatePatch::query(query));
        self.bus.emit(AppEvent::SearchResultsReady {
            query: query.to_string(),
            suggestions: view.suggestion_ids.clone(),
            results: view.result_ids.clone(),
            total: view.total,
        });
        Some(view)
    }

    /// Ranked guides for `query` under `filters`, without touching session
    /// state, history or metrics.
    #[must_use]
    pub fn query(&self, query: &str, filters: &FilterSet) -> Vec<Guide> {
        self.index
            .read()
            .query(query, filters)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Like [`SearchSystem::query`], keeping each guide's relevance score.
    #[must_use]
    pub fn query_scored(&self, query: &str, filters: &FilterSet) -> Vec<(Guide, f64)> {
        self.index
            .read()
            .query_scored(query, filters)
            .into_iter()
            .map(|scored| (scored.guide.clone(), scored.score))
            .collect()
    }

    /// Minimum accepted query length, in characters.
    #[must_use]
    pub const fn min_query_len(&self) -> usize {
        self.config.min_query_len
    }

    /// Replace the active filter and re-run the current query, if any.
    pub fn select_filter(&self, filter: &str) -> Option<SearchView> {
        let (active, query) = {
            let mut session = self.session.lock();
            session.filters.select(filter);
            (
                session.filters.iter().map(str::to_string).collect::<Vec<_>>(),
                session.view.query.clone(),
            )
        };
        debug!(filter, "filter changed");
        self.shared.update(StatePatch::filters(active));
        if query.is_empty() {
            None
        } else {
            self.handle_query(&query)
        }
    }

    /// Clear the query and hide the panel.
    pub fn clear(&self) {
        self.session.lock().view = SearchView::default();
        self.shared.update(StatePatch::query(""));
        self.bus.emit(AppEvent::SearchCleared);
        debug!("search cleared");
    }

    /// Replace the indexed collection.
    pub fn reindex(&self, guides: Vec<Guide>) {
        let mut index = self.index.write();
        index.rebuild(guides);
        info!(
            guides = index.guides().len(),
            terms = index.token_count(),
            "search index rebuilt"
        );
    }

    #[must_use]
    pub fn guide(&self, id: &str) -> Option<Guide> {
        self.index.read().get(id).cloned()
    }

    #[must_use]
    pub fn guides(&self) -> Vec<Guide> {
        self.index.read().guides().to_vec()
    }

    #[must_use]
    pub fn filter_counts(&self) -> Vec<FilterCount> {
        filter_counts(self.index.read().guides())
    }

    #[must_use]
    pub fn active_filters(&self) -> FilterSet {
        self.session.lock().filters.clone()
    }

    #[must_use]
    pub fn view(&self) -> SearchView {
        self.session.lock().view.clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().to_vec()
    }

    pub fn clear_history(&self) -> bool {
        let mut history = self.history.lock();
        history.clear();
        self.prefs.set_search_history(&history.to_vec())
    }

    #[must_use]
    pub fn stats(&self) -> SearchStats {
        let metrics = *self.metrics.lock();
        let index = self.index.read();
        SearchStats {
            total_searches: metrics.total_searches,
            average_response_ms: metrics.average_response_ms,
            total_indexed_items: index.guides().len(),
            index_size: index.token_count(),
            total_guides: index.guides().len(),
            history_size: self.history.lock().len(),
            active_filters: self.session.lock().filters.iter().count(),
        }
    }

    pub fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(self.bus.on(
            EventKind::SearchQueryChanged,
            weak_handler(&weak, |search, event| {
                if let AppEvent::SearchQueryChanged { query } = event {
                    search.handle_query(query);
                }
            }),
        ));
        subscriptions.push(self.bus.on(
            EventKind::FilterSelected,
            weak_handler(&weak, |search, event| {
                if let AppEvent::FilterSelected { filter } = event {
                    search.select_filter(filter);
                }
            }),
        ));
        subscriptions.push(self.bus.on(
            EventKind::EscapePressed,
            weak_handler(&weak, |search, _| search.clear()),
        ));
    }

    pub fn unsubscribe(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.unsubscribe();
        }
    }

    fn run(&self, query: &str, filters: &FilterSet) -> SearchView {
        let index = self.index.read();
        let ranked = index.query(query, filters);
        let renderer = Renderer::new(&self.sanitizer, &self.config.highlight_class);

        let suggested: Vec<&Guide> = ranked.iter().take(self.config.max_suggestions).copied().collect();
        let shown: Vec<&Guide> = ranked.iter().take(self.config.max_results).copied().collect();
        SearchView {
            query: query.to_string(),
            total: ranked.len(),
            suggestion_ids: suggested.iter().map(|g| g.id.clone()).collect(),
            result_ids: shown.iter().map(|g| g.id.clone()).collect(),
            suggestions: renderer.suggestions(&suggested, query),
            results: renderer.results(&shown, query),
            suggestions_visible: true,
            results_visible: !ranked.is_empty(),
        }
    }

    fn hide(&self, query: &str) {
        let mut session = self.session.lock();
        session.view = SearchView {
            query: query.to_string(),
            ..SearchView::default()
        };
    }

    /// Record `query` in the persisted history.
    pub fn remember(&self, query: &str) {
        let query = query.trim();
        let mut history = self.history.lock();
        if history.push(query) {
            self.prefs.set_search_history(&history.to_vec());
        }
    }
}

impl AppModule for SearchSystem {
    fn set_integration(self: Arc<Self>, _integration: &Integration) {
        self.subscribe();
    }
}

fn weak_handler<F>(weak: &Weak<SearchSystem>, f: F) -> impl Fn(&AppEvent) + Send + Sync + 'static
where
    F: Fn(&SearchSystem, &AppEvent) + Send + Sync + 'static,
{
    let weak = Weak::clone(weak);
    move |event| {
        if let Some(search) = weak.upgrade() {
            f(&search, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback_guides;
    use crate::storage::prefs::SEARCH_HISTORY_KEY;
    use crate::storage::{KeyValueStore, MemoryStore};

    struct Harness {
        search: Arc<SearchSystem>,
        bus: EventBus,
        store: Arc<MemoryStore>,
        shared: SharedState,
        seen: Arc<Mutex<Vec<AppEvent>>>,
    }

    fn harness() -> Harness {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on_any(move |event| {
            if !matches!(event, AppEvent::AppStateChanged { .. }) {
                sink.lock().push(event.clone());
            }
        });
        let store = Arc::new(MemoryStore::new());
        let shared = SharedState::new(bus.clone());
        let search = Arc::new(SearchSystem::new(
            fallback_guides(),
            Arc::new(Sanitizer::new()),
            Preferences::new(store.clone()),
            SearchConfig::default(),
            bus.clone(),
            shared.clone(),
        ));
        search.subscribe();
        Harness {
            search,
            bus,
            store,
            shared,
            seen,
        }
    }

    #[test]
    fn short_query_hides_panel() {
        let h = harness();
        assert!(h.search.handle_query("d").is_none());
        let view = h.search.view();
        assert!(!view.results_visible);
        assert!(!view.suggestions_visible);
        assert!(h.search.history().is_empty());
        assert_eq!(h.search.stats().total_searches, 0);
    }

    #[test]
    fn length_check_ignores_surrounding_whitespace() {
        let h = harness();
        assert!(h.search.handle_query(" d").is_none());
        assert!(h.search.handle_query("   ").is_none());
        assert!(h.search.history().is_empty());
        assert_eq!(h.search.stats().total_searches, 0);
        assert!(!h
            .seen
            .lock()
            .iter()
            .any(|event| matches!(event, AppEvent::SearchResultsReady { .. })));
    }

    #[test]
    fn padded_query_shares_a_history_entry() {
        let h = harness();
        let view = h.search.handle_query("drain ").unwrap();
        assert_eq!(view.query, "drain");
        h.search.handle_query("drain");
        assert_eq!(h.search.history(), vec!["drain"]);
        assert_eq!(h.shared.snapshot().search_query, "drain");
    }

    #[test]
    fn query_renders_and_announces() {
        let h = harness();
        let view = h.search.handle_query("drain").unwrap();
        assert_eq!(view.result_ids.first().map(String::as_str), Some("kitchen-001"));
        assert!(view.suggestion_ids.len() <= 5);
        assert_eq!(view.results.len(), view.result_ids.len());
        assert!(matches!(
            h.seen.lock().last(),
            Some(AppEvent::SearchResultsReady { query, total, .. }) if query == "drain" && *total == view.total
        ));
        assert_eq!(h.shared.snapshot().search_query, "drain");
        assert_eq!(h.search.stats().total_searches, 1);
    }

    #[test]
    fn no_matches_shows_placeholder_suggestion_only() {
        let h = harness();
        let view = h.search.handle_query("zzzz").unwrap();
        assert_eq!(view.total, 0);
        assert!(view.suggestions_visible);
        assert!(!view.results_visible);
        assert!(view.suggestions[0].has_class("no-suggestions"));
    }

    #[test]
    fn history_is_deduplicated_and_persisted() {
        let h = harness();
        h.search.handle_query("drain");
        h.search.handle_query("faucet");
        h.search.handle_query("drain");
        assert_eq!(h.search.history(), vec!["drain", "faucet"]);
        let stored = h.store.get(SEARCH_HISTORY_KEY).unwrap().unwrap();
        assert_eq!(stored, r#"["drain","faucet"]"#);
    }

    #[test]
    fn filter_reruns_current_query() {
        let h = harness();
        h.search.handle_query("water");
        let view = h.search.select_filter("bathroom").unwrap();
        let guides = h.search.guides();
        for id in &view.result_ids {
            let guide = guides.iter().find(|g| &g.id == id).unwrap();
            assert_eq!(guide.category.as_str(), "bathroom");
        }
        assert_eq!(h.shared.snapshot().active_filters, vec!["bathroom"]);
    }

    #[test]
    fn filter_without_query_only_updates_state() {
        let h = harness();
        assert!(h.search.select_filter("kitchen").is_none());
        assert!(h.search.active_filters().contains("kitchen"));
    }

    #[test]
    fn bus_events_drive_the_module() {
        let h = harness();
        h.bus.emit(AppEvent::SearchQueryChanged {
            query: "toilet".into(),
        });
        assert_eq!(h.search.view().query, "toilet");

        h.bus.emit(AppEvent::EscapePressed);
        assert_eq!(h.search.view(), SearchView::default());
        assert_eq!(h.shared.snapshot().search_query, "");
        assert!(h.seen.lock().contains(&AppEvent::SearchCleared));
    }

    #[test]
    fn history_restored_from_preferences() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        prefs.set_search_history(&["gutter".to_string(), "caulk".to_string()]);
        let bus = EventBus::new();
        let search = SearchSystem::new(
            fallback_guides(),
            Arc::new(Sanitizer::new()),
            prefs,
            SearchConfig::default(),
            bus.clone(),
            SharedState::new(bus),
        );
        assert_eq!(search.history(), vec!["gutter", "caulk"]);
        assert!(search.clear_history());
        assert!(search.history().is_empty());
    }

    #[test]
    fn unsubscribe_stops_reacting() {
        let h = harness();
        h.search.unsubscribe();
        h.bus.emit(AppEvent::SearchQueryChanged {
            query: "drain".into(),
        });
        assert!(h.search.view().query.is_empty());
    }
}
