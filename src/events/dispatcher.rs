//! Delegated host event dispatcher
//!
//! Every host event enters through [`EventDispatcher::dispatch`]. Click-like
//! events walk the target ancestry (target first) for a fixed set of marker
//! selectors; the first match wins and produces exactly one [`AppEvent`].
//! Anything unrecognized is counted and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::EventsConfig;
use crate::dom::{closest, Element};
use crate::error::Result;

use super::bus::{AppEvent, EventBus, EventKind, SwipeDirection};
use super::timing::{Debounced, Debouncer, ThrottleCache};

pub const SEARCH_INPUT_ID: &str = "searchInput";
pub const SEARCH_DEBOUNCE_KEY: &str = "search-input";
const RESIZE_THROTTLE_KEY: &str = "resize";
const TOUCH_MOVE_THROTTLE_KEY: &str = "touchmove";

const SEASONS: [&str; 4] = ["winter", "spring", "summer", "autumn"];

/// A key press with its modifier state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyInput {
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            ..Self::default()
        }
    }
}

/// Events produced by the host. `path` is the target ancestry, target first.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Click {
        path: Vec<Element>,
    },
    Input {
        path: Vec<Element>,
        value: String,
    },
    Change {
        path: Vec<Element>,
        value: String,
        checked: bool,
    },
    FocusIn {
        path: Vec<Element>,
    },
    FocusOut {
        path: Vec<Element>,
    },
    KeyDown {
        path: Vec<Element>,
        key: KeyInput,
    },
    TouchStart {
        x: f64,
        y: f64,
        touches: usize,
    },
    TouchEnd,
    TouchMove {
        x: f64,
        y: f64,
        touches: usize,
    },
    Resize {
        width: u32,
        height: u32,
    },
    VisibilityChange {
        hidden: bool,
    },
}

impl HostEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::Input { .. } => "input",
            Self::Change { .. } => "change",
            Self::FocusIn { .. } => "focusin",
            Self::FocusOut { .. } => "focusout",
            Self::KeyDown { .. } => "keydown",
            Self::TouchStart { .. } => "touchstart",
            Self::TouchEnd => "touchend",
            Self::TouchMove { .. } => "touchmove",
            Self::Resize { .. } => "resize",
            Self::VisibilityChange { .. } => "visibilitychange",
        }
    }
}

/// What became of one host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Emitted(EventKind),
    /// Scheduled behind a debounce timer.
    Deferred(EventKind),
    Throttled,
    /// Recorded internal state only (touch start).
    Tracked,
    Unmatched,
}

#[derive(Debug, Default)]
struct Metrics {
    total: AtomicU64,
    emitted: AtomicU64,
    throttled: AtomicU64,
    debounced: AtomicU64,
    unmatched: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherMetrics {
    pub total: u64,
    pub emitted: u64,
    pub throttled: u64,
    pub debounced: u64,
    pub unmatched: u64,
}

#[derive(Debug, Clone, Copy)]
struct TouchStart {
    at: Instant,
    x: f64,
    y: f64,
}

/// Routes host events onto the bus.
#[derive(Debug)]
pub struct EventDispatcher {
    bus: EventBus,
    config: EventsConfig,
    search_debounce: Duration,
    debouncer: Debouncer,
    throttles: ThrottleCache,
    touch: Mutex<Option<TouchStart>>,
    metrics: Arc<Metrics>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(bus: EventBus, config: EventsConfig, search_debounce: Duration) -> Self {
        Self {
            bus,
            config,
            search_debounce,
            debouncer: Debouncer::new(),
            throttles: ThrottleCache::new(),
            touch: Mutex::new(None),
            metrics: Arc::new(Metrics::default()),
        }
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn dispatch(&self, event: HostEvent) -> Dispatch {
        self.metrics.total.fetch_add(1, Ordering::Relaxed);
        trace!(host_event = event.name(), "dispatch");

        let outcome = match event {
            HostEvent::Click { path } => self.route_click(&path),
            HostEvent::Input { path, value } => self.route_input(&path, value),
            HostEvent::Change {
                path,
                value,
                checked,
            } => self.route_change(&path, value, checked),
            HostEvent::FocusIn { path } => path.first().map_or(Dispatch::Unmatched, |target| {
                self.emit(AppEvent::ElementFocused {
                    tag: target.tag.clone(),
                    id: target.id().map(str::to_string),
                })
            }),
            HostEvent::FocusOut { path } => path.first().map_or(Dispatch::Unmatched, |target| {
                self.emit(AppEvent::ElementBlurred {
                    tag: target.tag.clone(),
                    id: target.id().map(str::to_string),
                })
            }),
            HostEvent::KeyDown { path, key } => self.route_key(&path, key),
            HostEvent::TouchStart { x, y, touches } => {
                if touches == 1 {
                    *self.touch.lock() = Some(TouchStart {
                        at: Instant::now(),
                        x,
                        y,
                    });
                }
                Dispatch::Tracked
            }
            HostEvent::TouchEnd => self.route_touch_end(),
            HostEvent::TouchMove { x, y, touches } => self.route_touch_move(x, y, touches),
            HostEvent::Resize { width, height } => {
                let throttle = self.throttles.get(
                    RESIZE_THROTTLE_KEY,
                    Duration::from_millis(self.config.resize_throttle_ms),
                );
                if throttle.ready() {
                    self.emit(AppEvent::WindowResized { width, height })
                } else {
                    Dispatch::Throttled
                }
            }
            HostEvent::VisibilityChange { hidden } => self.emit(if hidden {
                AppEvent::PageHidden
            } else {
                AppEvent::PageVisible
            }),
        };

        match outcome {
            Dispatch::Unmatched => {
                self.metrics.unmatched.fetch_add(1, Ordering::Relaxed);
            }
            Dispatch::Throttled => {
                self.metrics.throttled.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        outcome
    }

    fn emit(&self, event: AppEvent) -> Dispatch {
        let kind = event.kind();
        self.metrics.emitted.fetch_add(1, Ordering::Relaxed);
        self.bus.emit(event);
        Dispatch::Emitted(kind)
    }

    fn route_click(&self, path: &[Element]) -> Dispatch {
        match click_event(path) {
            Ok(Some(event)) => self.emit(event),
            Ok(None) => Dispatch::Unmatched,
            Err(err) => {
                warn!(error = %err, "click routing failed");
                Dispatch::Unmatched
            }
        }
    }

    fn route_input(&self, path: &[Element], value: String) -> Dispatch {
        let Some(target) = path.first() else {
            return Dispatch::Unmatched;
        };
        if target.id() != Some(SEARCH_INPUT_ID) {
            return Dispatch::Unmatched;
        }

        self.metrics.debounced.fetch_add(1, Ordering::Relaxed);
        let bus = self.bus.clone();
        let metrics = Arc::clone(&self.metrics);
        let outcome = self
            .debouncer
            .debounce(SEARCH_DEBOUNCE_KEY, self.search_debounce, move || {
                metrics.emitted.fetch_add(1, Ordering::Relaxed);
                bus.emit(AppEvent::SearchQueryChanged { query: value });
            });
        match outcome {
            Debounced::Scheduled => Dispatch::Deferred(EventKind::SearchQueryChanged),
            Debounced::FiredNow => Dispatch::Emitted(EventKind::SearchQueryChanged),
        }
    }

    fn route_change(&self, path: &[Element], value: String, checked: bool) -> Dispatch {
        let Some(target) = path.first() else {
            return Dispatch::Unmatched;
        };
        let is_toggle = target.tag == "input"
            && matches!(target.attr("type"), Some("checkbox" | "radio"));
        if target.tag == "select" || is_toggle {
            self.emit(AppEvent::FormElementChanged {
                tag: target.tag.clone(),
                value,
                checked,
            })
        } else {
            Dispatch::Unmatched
        }
    }

    fn route_key(&self, path: &[Element], key: KeyInput) -> Dispatch {
        if key.ctrl || key.meta {
            return self.emit(AppEvent::KeyboardShortcut {
                key: key.key,
                ctrl: key.ctrl,
                meta: key.meta,
                shift: key.shift,
                alt: key.alt,
            });
        }
        match key.key.as_str() {
            "Escape" => self.emit(AppEvent::EscapePressed),
            "Enter" => self.emit(AppEvent::EnterPressed {
                target_id: path.first().and_then(Element::id).map(str::to_string),
            }),
            arrow @ ("ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") => {
                self.emit(AppEvent::ArrowKeyPressed {
                    direction: arrow.trim_start_matches("Arrow").to_lowercase(),
                })
            }
            _ => Dispatch::Unmatched,
        }
    }

    fn route_touch_end(&self) -> Dispatch {
        let Some(start) = self.touch.lock().take() else {
            return Dispatch::Unmatched;
        };
        let held = Instant::now().duration_since(start.at);
        let duration_ms = u64::try_from(held.as_millis()).unwrap_or(u64::MAX);
        if duration_ms < self.config.tap_max_ms {
            self.emit(AppEvent::TouchTap { duration_ms })
        } else if duration_ms > self.config.long_press_ms {
            self.emit(AppEvent::TouchLongPress { duration_ms })
        } else {
            Dispatch::Unmatched
        }
    }

    fn route_touch_move(&self, x: f64, y: f64, touches: usize) -> Dispatch {
        let throttle = self.throttles.get(
            TOUCH_MOVE_THROTTLE_KEY,
            Duration::from_millis(self.config.touch_move_throttle_ms),
        );
        if !throttle.ready() {
            return Dispatch::Throttled;
        }
        if touches != 1 {
            return Dispatch::Unmatched;
        }
        let Some(start) = *self.touch.lock() else {
            return Dispatch::Unmatched;
        };

        let (dx, dy) = (x - start.x, y - start.y);
        let threshold = self.config.swipe_threshold_px;
        if dx.abs() <= threshold && dy.abs() <= threshold {
            return Dispatch::Unmatched;
        }
        let direction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };
        self.emit(AppEvent::TouchSwipe { direction, dx, dy })
    }

    #[must_use]
    pub fn metrics(&self) -> DispatcherMetrics {
        DispatcherMetrics {
            total: self.metrics.total.load(Ordering::Relaxed),
            emitted: self.metrics.emitted.load(Ordering::Relaxed),
            throttled: self.metrics.throttled.load(Ordering::Relaxed),
            debounced: self.metrics.debounced.load(Ordering::Relaxed),
            unmatched: self.metrics.unmatched.load(Ordering::Relaxed),
        }
    }

    /// Cancel pending debounced calls and forget throttle state.
    pub fn shutdown(&self) {
        self.debouncer.cancel_all();
        self.throttles.clear();
        *self.touch.lock() = None;
        debug!("event dispatcher shut down");
    }
}

/// Map a click path to its application event. First matching marker wins.
///
/// A room card, nav item, chip or guide button without its `data-*` value
/// maps to nothing, so the click is counted as unmatched.
fn click_event(path: &[Element]) -> Result<Option<AppEvent>> {
    if let Some(card) = closest(path, ".room-card")? {
        return Ok(card.data("room").map(|room| AppEvent::RoomSelected {
            room: room.to_string(),
        }));
    }
    if let Some(item) = closest(path, ".nav-item")? {
        return Ok(item.data("page").map(|page| AppEvent::NavItemClicked {
            page: page.to_string(),
        }));
    }
    if let Some(chip) = closest(path, ".chip")? {
        return Ok(chip.data("filter").map(|filter| AppEvent::FilterSelected {
            filter: filter.to_string(),
        }));
    }
    if closest(path, "#themeToggle")?.is_some() {
        return Ok(Some(AppEvent::ThemeToggleRequested));
    }
    if let Some(issue) = closest(path, ".issue-item")? {
        let heading = issue.children.iter().find(|child| child.tag == "h4");
        let title = issue.data("issue").map_or_else(
            || heading.map_or(issue.text.trim(), |h| h.text.trim()).to_string(),
            str::to_string,
        );
        return Ok(Some(AppEvent::IssueSelected { title }));
    }
    if let Some(task) = closest(path, ".task-card")? {
        let season = task
            .classes()
            .find(|class| SEASONS.contains(class))
            .map(str::to_string);
        return Ok(Some(AppEvent::SeasonalTaskSelected { season }));
    }
    for selector in [".view-guide-btn", ".search-suggestion", ".search-result-item"] {
        if let Some(target) = closest(path, selector)? {
            return Ok(target.data("guide-id").map(|id| AppEvent::GuideRequested {
                guide_id: id.to_string(),
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    fn dispatcher() -> (EventDispatcher, Arc<PlMutex<Vec<AppEvent>>>) {
        let bus = EventBus::new();
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on_any(move |event| sink.lock().push(event.clone()));
        let dispatcher =
            EventDispatcher::new(bus, EventsConfig::default(), Duration::from_millis(300));
        (dispatcher, seen)
    }

    fn click(path: Vec<Element>) -> HostEvent {
        HostEvent::Click { path }
    }

    #[test]
    fn click_inside_room_card_selects_room() {
        let (dispatcher, seen) = dispatcher();
        let path = vec![
            Element::new("span").with_text("Kitchen"),
            Element::new("div")
                .with_class("room-card")
                .with_data("room", "kitchen"),
            Element::new("main"),
        ];
        assert_eq!(
            dispatcher.dispatch(click(path)),
            Dispatch::Emitted(EventKind::RoomSelected)
        );
        assert_eq!(
            seen.lock()[0],
            AppEvent::RoomSelected {
                room: "kitchen".into()
            }
        );
    }

    #[test]
    fn first_marker_wins() {
        let (dispatcher, seen) = dispatcher();
        // A chip nested in a nav item: .nav-item is checked before .chip.
        let path = vec![
            Element::new("button")
                .with_class("chip")
                .with_data("filter", "kitchen"),
            Element::new("li")
                .with_class("nav-item")
                .with_data("page", "search"),
        ];
        dispatcher.dispatch(click(path));
        assert_eq!(
            seen.lock()[0],
            AppEvent::NavItemClicked {
                page: "search".into()
            }
        );
    }

    #[test]
    fn task_card_reports_season_class() {
        let (dispatcher, seen) = dispatcher();
        let path = vec![Element::new("div")
            .with_class("task-card")
            .with_class("winter")];
        dispatcher.dispatch(click(path));
        assert_eq!(
            seen.lock()[0],
            AppEvent::SeasonalTaskSelected {
                season: Some("winter".into())
            }
        );
    }

    #[test]
    fn result_item_requests_guide() {
        let (dispatcher, seen) = dispatcher();
        let path = vec![
            Element::new("h4"),
            Element::new("div")
                .with_class("search-result-item")
                .with_data("guide-id", "kitchen-001"),
        ];
        dispatcher.dispatch(click(path));
        assert_eq!(
            seen.lock()[0],
            AppEvent::GuideRequested {
                guide_id: "kitchen-001".into()
            }
        );
    }

    #[test]
    fn unmatched_click_is_counted() {
        let (dispatcher, seen) = dispatcher();
        let outcome = dispatcher.dispatch(click(vec![Element::new("p")]));
        assert_eq!(outcome, Dispatch::Unmatched);
        assert!(seen.lock().is_empty());
        let metrics = dispatcher.metrics();
        assert_eq!(metrics.total, 1);
        assert_eq!(metrics.unmatched, 1);
    }

    #[test]
    fn marker_without_data_value_is_unmatched() {
        let (dispatcher, seen) = dispatcher();
        for marker in ["room-card", "nav-item", "chip", "view-guide-btn"] {
            let outcome = dispatcher.dispatch(click(vec![
                Element::new("span"),
                Element::new("div").with_class(marker),
            ]));
            assert_eq!(outcome, Dispatch::Unmatched, "{marker}");
        }
        assert!(seen.lock().is_empty());
        assert_eq!(dispatcher.metrics().unmatched, 4);
    }

    #[test]
    fn issue_title_comes_from_heading() {
        let (dispatcher, seen) = dispatcher();
        let mut item = Element::new("div").with_class("issue-item");
        item.append_child(Element::new("h4").with_text(" Leaky Faucet "));
        dispatcher.dispatch(click(vec![Element::new("span"), item]));
        assert_eq!(
            seen.lock()[0],
            AppEvent::IssueSelected {
                title: "Leaky Faucet".into()
            }
        );
    }

    #[test]
    fn theme_toggle_by_id() {
        let (dispatcher, seen) = dispatcher();
        dispatcher.dispatch(click(vec![
            Element::new("svg"),
            Element::new("button").with_id("themeToggle"),
        ]));
        assert_eq!(seen.lock()[0], AppEvent::ThemeToggleRequested);
    }

    #[test]
    fn keys_map_to_named_events() {
        let (dispatcher, seen) = dispatcher();
        let path = vec![Element::new("body")];
        dispatcher.dispatch(HostEvent::KeyDown {
            path: path.clone(),
            key: KeyInput::plain("Escape"),
        });
        dispatcher.dispatch(HostEvent::KeyDown {
            path: path.clone(),
            key: KeyInput::plain("ArrowLeft"),
        });
        dispatcher.dispatch(HostEvent::KeyDown {
            path: path.clone(),
            key: KeyInput::ctrl("k"),
        });
        let outcome = dispatcher.dispatch(HostEvent::KeyDown {
            path,
            key: KeyInput::plain("x"),
        });

        assert_eq!(outcome, Dispatch::Unmatched);
        let seen = seen.lock();
        assert_eq!(seen[0], AppEvent::EscapePressed);
        assert_eq!(
            seen[1],
            AppEvent::ArrowKeyPressed {
                direction: "left".into()
            }
        );
        assert_eq!(seen[2].kind(), EventKind::KeyboardShortcut);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn change_only_for_form_toggles() {
        let (dispatcher, seen) = dispatcher();
        let checkbox = Element::new("input").with_attr("type", "checkbox");
        let text = Element::new("input").with_attr("type", "text");
        dispatcher.dispatch(HostEvent::Change {
            path: vec![checkbox],
            value: "on".into(),
            checked: true,
        });
        let outcome = dispatcher.dispatch(HostEvent::Change {
            path: vec![text],
            value: "x".into(),
            checked: false,
        });
        assert_eq!(outcome, Dispatch::Unmatched);
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn search_input_is_debounced() {
        let (dispatcher, seen) = dispatcher();
        let input = || vec![Element::new("input").with_id(SEARCH_INPUT_ID)];
        for value in ["d", "dr", "dra", "drai", "drain"] {
            let outcome = dispatcher.dispatch(HostEvent::Input {
                path: input(),
                value: value.into(),
            });
            assert_eq!(outcome, Dispatch::Deferred(EventKind::SearchQueryChanged));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![AppEvent::SearchQueryChanged {
                query: "drain".into()
            }]
        );
        assert_eq!(dispatcher.metrics().debounced, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn resize_is_throttled() {
        let (dispatcher, seen) = dispatcher();
        let resize = || HostEvent::Resize {
            width: 800,
            height: 600,
        };
        assert_eq!(
            dispatcher.dispatch(resize()),
            Dispatch::Emitted(EventKind::WindowResized)
        );
        assert_eq!(dispatcher.dispatch(resize()), Dispatch::Throttled);
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(
            dispatcher.dispatch(resize()),
            Dispatch::Emitted(EventKind::WindowResized)
        );
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(dispatcher.metrics().throttled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_tap_and_long_press() {
        let (dispatcher, seen) = dispatcher();
        dispatcher.dispatch(HostEvent::TouchStart {
            x: 0.0,
            y: 0.0,
            touches: 1,
        });
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(
            dispatcher.dispatch(HostEvent::TouchEnd),
            Dispatch::Emitted(EventKind::TouchTap)
        );

        dispatcher.dispatch(HostEvent::TouchStart {
            x: 0.0,
            y: 0.0,
            touches: 1,
        });
        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(
            dispatcher.dispatch(HostEvent::TouchEnd),
            Dispatch::Emitted(EventKind::TouchLongPress)
        );

        dispatcher.dispatch(HostEvent::TouchStart {
            x: 0.0,
            y: 0.0,
            touches: 1,
        });
        tokio::time::advance(Duration::from_millis(300)).await;
        assert_eq!(dispatcher.dispatch(HostEvent::TouchEnd), Dispatch::Unmatched);
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_move_past_threshold_swipes() {
        let (dispatcher, seen) = dispatcher();
        dispatcher.dispatch(HostEvent::TouchStart {
            x: 100.0,
            y: 100.0,
            touches: 1,
        });
        assert_eq!(
            dispatcher.dispatch(HostEvent::TouchMove {
                x: 120.0,
                y: 100.0,
                touches: 1
            }),
            Dispatch::Unmatched
        );
        tokio::time::advance(Duration::from_millis(20)).await;
        dispatcher.dispatch(HostEvent::TouchMove {
            x: 30.0,
            y: 110.0,
            touches: 1,
        });
        match &seen.lock()[0] {
            AppEvent::TouchSwipe { direction, .. } => assert_eq!(*direction, SwipeDirection::Left),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn visibility_changes() {
        let (dispatcher, seen) = dispatcher();
        dispatcher.dispatch(HostEvent::VisibilityChange { hidden: true });
        dispatcher.dispatch(HostEvent::VisibilityChange { hidden: false });
        assert_eq!(
            *seen.lock(),
            vec![AppEvent::PageHidden, AppEvent::PageVisible]
        );
    }
}
