//! In-process publish/subscribe
//!
//! Delivery is synchronous and in subscription order. The subscriber list is
//! snapshotted before delivery, so handlers may emit, subscribe or
//! unsubscribe while an event is being delivered. A panicking handler is
//! caught and forwarded to the panic sink; later subscribers still run.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::app::AppState;
use crate::diagnostics::Severity;
use crate::storage::Theme;

/// Swipe direction derived from the dominant axis of a touch move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Application events carried by the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppEvent {
    // Lifecycle
    AppReady { state: AppState },
    AppStateChanged { changed: Vec<String>, state: AppState },
    ModuleFailed { module: String, reason: String },
    ErrorReported {
        id: String,
        kind: String,
        message: String,
        severity: Severity,
    },

    // Delegated clicks
    RoomSelected { room: String },
    NavItemClicked { page: String },
    FilterSelected { filter: String },
    ThemeToggleRequested,
    IssueSelected { title: String },
    SeasonalTaskSelected { season: Option<String> },
    GuideRequested { guide_id: String },

    // Forms and focus
    SearchQueryChanged { query: String },
    FormElementChanged {
        tag: String,
        value: String,
        checked: bool,
    },
    ElementFocused { tag: String, id: Option<String> },
    ElementBlurred { tag: String, id: Option<String> },

    // Keyboard
    EscapePressed,
    EnterPressed { target_id: Option<String> },
    ArrowKeyPressed { direction: String },
    KeyboardShortcut {
        key: String,
        ctrl: bool,
        meta: bool,
        shift: bool,
        alt: bool,
    },

    // Touch and window
    TouchTap { duration_ms: u64 },
    TouchLongPress { duration_ms: u64 },
    TouchSwipe {
        direction: SwipeDirection,
        dx: f64,
        dy: f64,
    },
    WindowResized { width: u32, height: u32 },
    PageHidden,
    PageVisible,

    // Search
    SearchResultsReady {
        query: String,
        suggestions: Vec<String>,
        results: Vec<String>,
        total: usize,
    },
    SearchCleared,

    // Navigation
    RoomNavigation {
        room: String,
        previous_room: Option<String>,
    },
    PageNavigation {
        page: String,
        previous_page: String,
    },
    SeasonalTaskNavigation { season: String },
    IssueNavigation { issue: String },

    // Viewer and preferences
    GuideOpened { guide_id: String, title: String },
    GuideClosed { guide_id: String },
    FavoriteToggled { guide_id: String, favorite: bool },
    ThemeChanged { theme: Theme },
}

/// Payload-free discriminant of [`AppEvent`], used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    AppReady,
    AppStateChanged,
    ModuleFailed,
    ErrorReported,
    RoomSelected,
    NavItemClicked,
    FilterSelected,
    ThemeToggleRequested,
    IssueSelected,
    SeasonalTaskSelected,
    GuideRequested,
    SearchQueryChanged,
    FormElementChanged,
    ElementFocused,
    ElementBlurred,
    EscapePressed,
    EnterPressed,
    ArrowKeyPressed,
    KeyboardShortcut,
    TouchTap,
    TouchLongPress,
    TouchSwipe,
    WindowResized,
    PageHidden,
    PageVisible,
    SearchResultsReady,
    SearchCleared,
    RoomNavigation,
    PageNavigation,
    SeasonalTaskNavigation,
    IssueNavigation,
    GuideOpened,
    GuideClosed,
    FavoriteToggled,
    ThemeChanged,
}

impl EventKind {
    /// Wire name, e.g. `ROOM_SELECTED`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AppReady => "APP_READY",
            Self::AppStateChanged => "APP_STATE_CHANGED",
            Self::ModuleFailed => "MODULE_FAILED",
            Self::ErrorReported => "ERROR_REPORTED",
            Self::RoomSelected => "ROOM_SELECTED",
            Self::NavItemClicked => "NAV_ITEM_CLICKED",
            Self::FilterSelected => "FILTER_SELECTED",
            Self::ThemeToggleRequested => "THEME_TOGGLE_REQUESTED",
            Self::IssueSelected => "ISSUE_SELECTED",
            Self::SeasonalTaskSelected => "SEASONAL_TASK_SELECTED",
            Self::GuideRequested => "GUIDE_REQUESTED",
            Self::SearchQueryChanged => "SEARCH_QUERY_CHANGED",
            Self::FormElementChanged => "FORM_ELEMENT_CHANGED",
            Self::ElementFocused => "ELEMENT_FOCUSED",
            Self::ElementBlurred => "ELEMENT_BLURRED",
            Self::EscapePressed => "ESCAPE_PRESSED",
            Self::EnterPressed => "ENTER_PRESSED",
            Self::ArrowKeyPressed => "ARROW_KEY_PRESSED",
            Self::KeyboardShortcut => "KEYBOARD_SHORTCUT",
            Self::TouchTap => "TOUCH_TAP",
            Self::TouchLongPress => "TOUCH_LONG_PRESS",
            Self::TouchSwipe => "TOUCH_SWIPE",
            Self::WindowResized => "WINDOW_RESIZED",
            Self::PageHidden => "PAGE_HIDDEN",
            Self::PageVisible => "PAGE_VISIBLE",
            Self::SearchResultsReady => "SEARCH_RESULTS_READY",
            Self::SearchCleared => "SEARCH_CLEARED",
            Self::RoomNavigation => "ROOM_NAVIGATION",
            Self::PageNavigation => "PAGE_NAVIGATION",
            Self::SeasonalTaskNavigation => "SEASONAL_TASK_NAVIGATION",
            Self::IssueNavigation => "ISSUE_NAVIGATION",
            Self::GuideOpened => "GUIDE_OPENED",
            Self::GuideClosed => "GUIDE_CLOSED",
            Self::FavoriteToggled => "FAVORITE_TOGGLED",
            Self::ThemeChanged => "THEME_CHANGED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AppEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::AppReady { .. } => EventKind::AppReady,
            Self::AppStateChanged { .. } => EventKind::AppStateChanged,
            Self::ModuleFailed { .. } => EventKind::ModuleFailed,
            Self::ErrorReported { .. } => EventKind::ErrorReported,
            Self::RoomSelected { .. } => EventKind::RoomSelected,
            Self::NavItemClicked { .. } => EventKind::NavItemClicked,
            Self::FilterSelected { .. } => EventKind::FilterSelected,
            Self::ThemeToggleRequested => EventKind::ThemeToggleRequested,
            Self::IssueSelected { .. } => EventKind::IssueSelected,
            Self::SeasonalTaskSelected { .. } => EventKind::SeasonalTaskSelected,
            Self::GuideRequested { .. } => EventKind::GuideRequested,
            Self::SearchQueryChanged { .. } => EventKind::SearchQueryChanged,
            Self::FormElementChanged { .. } => EventKind::FormElementChanged,
            Self::ElementFocused { .. } => EventKind::ElementFocused,
            Self::ElementBlurred { .. } => EventKind::ElementBlurred,
            Self::EscapePressed => EventKind::EscapePressed,
            Self::EnterPressed { .. } => EventKind::EnterPressed,
            Self::ArrowKeyPressed { .. } => EventKind::ArrowKeyPressed,
            Self::KeyboardShortcut { .. } => EventKind::KeyboardShortcut,
            Self::TouchTap { .. } => EventKind::TouchTap,
            Self::TouchLongPress { .. } => EventKind::TouchLongPress,
            Self::TouchSwipe { .. } => EventKind::TouchSwipe,
            Self::WindowResized { .. } => EventKind::WindowResized,
            Self::PageHidden => EventKind::PageHidden,
            Self::PageVisible => EventKind::PageVisible,
            Self::SearchResultsReady { .. } => EventKind::SearchResultsReady,
            Self::SearchCleared => EventKind::SearchCleared,
            Self::RoomNavigation { .. } => EventKind::RoomNavigation,
            Self::PageNavigation { .. } => EventKind::PageNavigation,
            Self::SeasonalTaskNavigation { .. } => EventKind::SeasonalTaskNavigation,
            Self::IssueNavigation { .. } => EventKind::IssueNavigation,
            Self::GuideOpened { .. } => EventKind::GuideOpened,
            Self::GuideClosed { .. } => EventKind::GuideClosed,
            Self::FavoriteToggled { .. } => EventKind::FavoriteToggled,
            Self::ThemeChanged { .. } => EventKind::ThemeChanged,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }
}

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Receives handler panics: the event kind and the panic message.
pub type PanicSink = Arc<dyn Fn(EventKind, &str) + Send + Sync>;

struct Listener {
    id: u64,
    kind: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<Vec<Listener>>,
    panic_sink: RwLock<Option<PanicSink>>,
    next_id: AtomicU64,
    emitted: AtomicU64,
    delivered: AtomicU64,
    panics: AtomicU64,
}

/// Counters for one bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    pub subscribers: usize,
    pub emitted: u64,
    pub delivered: u64,
    pub panics: u64,
}

/// Cheaply cloneable handle to a shared bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("stats", &self.stats())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.subscribe(Some(kind), Arc::new(handler))
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.subscribe(None, Arc::new(handler))
    }

    fn subscribe(&self, kind: Option<EventKind>, handler: Handler) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push(Listener { id, kind, handler });
        trace!(id, kind = ?kind, "subscribed");
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Install the callback that receives handler panics.
    pub fn set_panic_sink(&self, sink: PanicSink) {
        *self.inner.panic_sink.write() = Some(sink);
    }

    /// Deliver `event` to current subscribers. Returns how many handlers ran.
    pub fn emit(&self, event: AppEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|listener| listener.kind.is_none_or(|k| k == kind))
            .map(|listener| Arc::clone(&listener.handler))
            .collect();

        self.inner.emitted.fetch_add(1, Ordering::Relaxed);
        debug!(event = kind.name(), subscribers = handlers.len(), "emit");

        let mut delivered = 0;
        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    self.inner.panics.fetch_add(1, Ordering::Relaxed);
                    let message = panic_message(payload.as_ref());
                    error!(event = kind.name(), %message, "event handler panicked");
                    let sink = self.inner.panic_sink.read().clone();
                    if let Some(sink) = sink {
                        sink(kind, &message);
                    }
                }
            }
        }
        self.inner
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Number of handlers that would receive an event of `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .listeners
            .read()
            .iter()
            .filter(|listener| listener.kind.is_none_or(|k| k == kind))
            .count()
    }

    #[must_use]
    pub fn stats(&self) -> BusStats {
        BusStats {
            subscribers: self.inner.listeners.read().len(),
            emitted: self.inner.emitted.load(Ordering::Relaxed),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            panics: self.inner.panics.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Handle returned by [`EventBus::on`]. Dropping it keeps the subscription.
#[derive(Debug, Clone)]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Remove the handler. Returns `false` if it was already removed or the
    /// bus is gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let mut listeners = bus.listeners.write();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != self.id);
        listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(bus: &EventBus, kind: EventKind) -> (Arc<Mutex<Vec<AppEvent>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.on(kind, move |event| sink.lock().push(event.clone()));
        (seen, sub)
    }

    #[test]
    fn delivers_only_matching_kind() {
        let bus = EventBus::new();
        let (rooms, _sub) = recorder(&bus, EventKind::RoomSelected);

        bus.emit(AppEvent::PageHidden);
        bus.emit(AppEvent::RoomSelected {
            room: "kitchen".into(),
        });

        let rooms = rooms.lock();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name(), "ROOM_SELECTED");
    }

    #[test]
    fn delivers_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            bus.on(EventKind::EscapePressed, move |_| order.lock().push(n));
        }
        assert_eq!(bus.emit(AppEvent::EscapePressed), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribe_removes_handler_once() {
        let bus = EventBus::new();
        let (seen, sub) = recorder(&bus, EventKind::PageVisible);
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        bus.emit(AppEvent::PageVisible);
        assert!(seen.lock().is_empty());
        assert_eq!(bus.subscriber_count(EventKind::PageVisible), 0);
    }

    #[test]
    fn on_any_sees_everything() {
        let bus = EventBus::new();
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        bus.on_any(move |event| sink.lock().push(event.name()));
        bus.emit(AppEvent::PageHidden);
        bus.emit(AppEvent::SearchCleared);
        assert_eq!(*names.lock(), vec!["PAGE_HIDDEN", "SEARCH_CLEARED"]);
    }

    #[test]
    fn reentrant_emit_is_allowed() {
        let bus = EventBus::new();
        let chained = bus.clone();
        bus.on(EventKind::RoomSelected, move |event| {
            if let AppEvent::RoomSelected { room } = event {
                chained.emit(AppEvent::RoomNavigation {
                    room: room.clone(),
                    previous_room: None,
                });
            }
        });
        let (nav, _sub) = recorder(&bus, EventKind::RoomNavigation);

        bus.emit(AppEvent::RoomSelected {
            room: "bathroom".into(),
        });
        assert_eq!(nav.lock().len(), 1);
    }

    #[test]
    fn handler_panic_is_contained_and_reported() {
        let bus = EventBus::new();
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        bus.set_panic_sink(Arc::new(move |kind, message| {
            sink.lock().push(format!("{kind}: {message}"));
        }));

        bus.on(EventKind::EnterPressed, |_| panic!("boom"));
        let (seen, _sub) = recorder(&bus, EventKind::EnterPressed);

        let delivered = bus.emit(AppEvent::EnterPressed { target_id: None });
        assert_eq!(delivered, 1);
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(*reported.lock(), vec!["ENTER_PRESSED: boom".to_string()]);
        assert_eq!(bus.stats().panics, 1);
    }

    #[test]
    fn events_serialize_with_wire_names() {
        let json = serde_json::to_value(AppEvent::FilterSelected {
            filter: "kitchen".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "FILTER_SELECTED");
        assert_eq!(json["payload"]["filter"], "kitchen");
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let sub = {
            let bus = EventBus::new();
            bus.on(EventKind::PageHidden, |_| {})
        };
        assert!(!sub.unsubscribe());
    }
}
