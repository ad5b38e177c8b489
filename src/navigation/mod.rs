//! Room, page and seasonal navigation
//!
//! Holds the current page and room, a bounded navigation history, and turns
//! selection events from the dispatcher into navigation events.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{SharedState, StatePatch, HOME_PAGE};
use crate::bootstrap::{AppModule, Integration};
use crate::events::{AppEvent, EventBus, EventKind, Subscription};

pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const ROOMS: [Destination; 6] = [
    Destination {
        key: "kitchen",
        title: "Kitchen",
        description: "Common kitchen problems and solutions",
    },
    Destination {
        key: "bathroom",
        title: "Bathroom",
        description: "Plumbing and bathroom maintenance",
    },
    Destination {
        key: "bedroom",
        title: "Bedroom",
        description: "Bedroom comfort and maintenance",
    },
    Destination {
        key: "living-room",
        title: "Living Room",
        description: "Living area maintenance and comfort",
    },
    Destination {
        key: "office",
        title: "Home Office",
        description: "Workspace optimization and maintenance",
    },
    Destination {
        key: "outdoor",
        title: "Outdoor",
        description: "External maintenance and landscaping",
    },
];

/// Pages and their routes.
pub const PAGES: [(Destination, &str); 4] = [
    (
        Destination {
            key: "home",
            title: "Home",
            description: "Main dashboard",
        },
        "/",
    ),
    (
        Destination {
            key: "search",
            title: "Search",
            description: "Search maintenance guides",
        },
        "/search",
    ),
    (
        Destination {
            key: "favorites",
            title: "Saved",
            description: "Saved maintenance guides",
        },
        "/favorites",
    ),
    (
        Destination {
            key: "emergency",
            title: "Emergency",
            description: "Emergency procedures and contacts",
        },
        "/emergency",
    ),
];

pub const SEASONS: [Destination; 4] = [
    Destination {
        key: "winter",
        title: "Winter Prep",
        description: "Heating & insulation tasks",
    },
    Destination {
        key: "spring",
        title: "Spring Clean",
        description: "Deep cleaning & repairs",
    },
    Destination {
        key: "summer",
        title: "Summer Care",
        description: "Cooling & outdoor maintenance",
    },
    Destination {
        key: "autumn",
        title: "Autumn Prep",
        description: "Weatherproofing tasks",
    },
];

pub const EMERGENCY_CONTACTS: [&str; 4] = [
    "Gas Emergency: 0800 111 999",
    "Electrical Emergency: Contact local electrician",
    "Water Emergency: Turn off main water supply",
    "Fire: Call 112 (EU Emergency Number)",
];

#[must_use]
pub fn room(key: &str) -> Option<&'static Destination> {
    ROOMS.iter().find(|room| room.key == key)
}

#[must_use]
pub fn page(key: &str) -> Option<&'static Destination> {
    PAGES.iter().map(|(page, _)| page).find(|page| page.key == key)
}

#[must_use]
pub fn season(key: &str) -> Option<&'static Destination> {
    SEASONS.iter().find(|season| season.key == key)
}

#[must_use]
pub fn route(page_key: &str) -> Option<&'static str> {
    PAGES
        .iter()
        .find(|(page, _)| page.key == page_key)
        .map(|(_, route)| *route)
}

/// Page and room encoded in a location such as `/search?x#room-kitchen`.
#[must_use]
pub fn parse_location(location: &str) -> (&'static str, Option<String>) {
    let (before_hash, hash) = location
        .split_once('#')
        .map_or((location, None), |(head, hash)| (head, Some(hash)));
    let (path, query) = before_hash
        .split_once('?')
        .map_or((before_hash, ""), |(path, query)| (path, query));
    let has_param = |name: &str| {
        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some(name))
    };

    let page = ["search", "favorites", "emergency"]
        .into_iter()
        .find(|key| route(key) == Some(path) || has_param(*key))
        .unwrap_or(HOME_PAGE);
    let room = hash
        .and_then(|hash| hash.strip_prefix("room-"))
        .filter(|room| !room.is_empty())
        .map(str::to_string);
    (page, room)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigationAction {
    NavigateRoom {
        room: String,
        previous_room: Option<String>,
    },
    NavigatePage {
        page: String,
        previous_page: String,
        previous_room: Option<String>,
    },
    NavigateSeasonalTask {
        season: String,
    },
    NavigateIssue {
        issue: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    #[serde(flatten)]
    pub action: NavigationAction,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationSnapshot {
    pub current_page: String,
    pub current_room: Option<String>,
    pub history_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationStats {
    pub total_rooms: usize,
    pub total_pages: usize,
    pub total_seasons: usize,
    pub history_length: usize,
    pub current_page: String,
    pub current_room: Option<String>,
}

#[derive(Debug)]
struct NavState {
    current_page: String,
    current_room: Option<String>,
    history: VecDeque<NavigationEntry>,
}

/// Navigation state machine.
#[derive(Debug)]
pub struct NavigationManager {
    nav: Mutex<NavState>,
    bus: EventBus,
    shared: SharedState,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl NavigationManager {
    #[must_use]
    pub fn new(bus: EventBus, shared: SharedState) -> Self {
        Self {
            nav: Mutex::new(NavState {
                current_page: HOME_PAGE.to_string(),
                current_room: None,
                history: VecDeque::new(),
            }),
            bus,
            shared,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Reset page and room from a location string. Does not touch history.
    pub fn initialize_from_location(&self, location: &str) {
        let (page, room) = parse_location(location);
        let current_room = {
            let mut nav = self.nav.lock();
            nav.current_page = page.to_string();
            if room.is_some() {
                nav.current_room = room;
            }
            nav.current_room.clone()
        };
        self.shared
            .update(StatePatch::page(page).with_room(current_room));
        debug!(page, "navigation initialized from location");
    }

    pub fn navigate_to_room(&self, room_key: &str) -> bool {
        let Some(destination) = room(room_key) else {
            warn!(room = room_key, "unknown room");
            return false;
        };
        let previous_room = {
            let mut nav = self.nav.lock();
            let previous = nav.current_room.replace(room_key.to_string());
            push_history(
                &mut nav.history,
                NavigationAction::NavigateRoom {
                    room: room_key.to_string(),
                    previous_room: previous.clone(),
                },
            );
            previous
        };
        self.shared
            .update(StatePatch::default().with_room(Some(room_key.to_string())));
        info!(room = room_key, title = destination.title, "navigated to room");
        self.bus.emit(AppEvent::RoomNavigation {
            room: room_key.to_string(),
            previous_room,
        });
        true
    }

    pub fn navigate_to_page(&self, page_key: &str) -> bool {
        let Some(destination) = page(page_key) else {
            warn!(page = page_key, "unknown page");
            return false;
        };
        let (previous_page, current_room) = {
            let mut nav = self.nav.lock();
            let previous_page = std::mem::replace(&mut nav.current_page, page_key.to_string());
            let previous_room = nav.current_room.clone();
            if page_key != HOME_PAGE {
                nav.current_room = None;
            }
            push_history(
                &mut nav.history,
                NavigationAction::NavigatePage {
                    page: page_key.to_string(),
                    previous_page: previous_page.clone(),
                    previous_room,
                },
            );
            (previous_page, nav.current_room.clone())
        };
        self.shared
            .update(StatePatch::page(page_key).with_room(current_room));
        info!(page = page_key, title = destination.title, "navigated to page");
        self.bus.emit(AppEvent::PageNavigation {
            page: page_key.to_string(),
            previous_page,
        });
        true
    }

    pub fn navigate_to_seasonal_task(&self, season_key: &str) -> bool {
        if season(season_key).is_none() {
            warn!(season = season_key, "unknown season");
            return false;
        }
        push_history(
            &mut self.nav.lock().history,
            NavigationAction::NavigateSeasonalTask {
                season: season_key.to_string(),
            },
        );
        info!(season = season_key, "navigated to seasonal task");
        self.bus.emit(AppEvent::SeasonalTaskNavigation {
            season: season_key.to_string(),
        });
        true
    }

    pub fn navigate_to_issue(&self, issue: &str) -> bool {
        let issue = issue.trim();
        if issue.is_empty() {
            warn!("could not find issue title");
            return false;
        }
        push_history(
            &mut self.nav.lock().history,
            NavigationAction::NavigateIssue {
                issue: issue.to_string(),
            },
        );
        info!(issue, "navigated to issue");
        self.bus.emit(AppEvent::IssueNavigation {
            issue: issue.to_string(),
        });
        true
    }

    /// Undo the most recent navigation. Returns `false` with empty history.
    pub fn go_back(&self) -> bool {
        let (page, room) = {
            let mut nav = self.nav.lock();
            let Some(entry) = nav.history.pop_back() else {
                return false;
            };
            match entry.action {
                NavigationAction::NavigateRoom { previous_room, .. } => {
                    nav.current_room = previous_room;
                }
                NavigationAction::NavigatePage {
                    previous_page,
                    previous_room,
                    ..
                } => {
                    nav.current_page = previous_page;
                    nav.current_room = previous_room;
                }
                NavigationAction::NavigateSeasonalTask { .. }
                | NavigationAction::NavigateIssue { .. } => {}
            }
            (nav.current_page.clone(), nav.current_room.clone())
        };
        debug!(page = %page, room = ?room, "navigated back");
        self.shared.update(StatePatch::page(page).with_room(room));
        true
    }

    /// Keyboard shortcut keys: h, s, f, e for pages and b for back.
    pub fn handle_shortcut(&self, key: &str) -> bool {
        match key.to_lowercase().as_str() {
            "h" => self.navigate_to_page("home"),
            "s" => self.navigate_to_page("search"),
            "f" => self.navigate_to_page("favorites"),
            "e" => self.navigate_to_page("emergency"),
            "b" => self.go_back(),
            _ => false,
        }
    }

    #[must_use]
    pub fn current_state(&self) -> NavigationSnapshot {
        let nav = self.nav.lock();
        NavigationSnapshot {
            current_page: nav.current_page.clone(),
            current_room: nav.current_room.clone(),
            history_length: nav.history.len(),
        }
    }

    #[must_use]
    pub fn history(&self) -> Vec<NavigationEntry> {
        self.nav.lock().history.iter().cloned().collect()
    }

    #[must_use]
    pub fn stats(&self) -> NavigationStats {
        let nav = self.nav.lock();
        NavigationStats {
            total_rooms: ROOMS.len(),
            total_pages: PAGES.len(),
            total_seasons: SEASONS.len(),
            history_length: nav.history.len(),
            current_page: nav.current_page.clone(),
            current_room: nav.current_room.clone(),
        }
    }

    /// Subscribe to the selection events this manager reacts to.
    pub fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(self.bus.on(EventKind::RoomSelected, weak_handler(&weak, |nav, event| {
            if let AppEvent::RoomSelected { room } = event {
                nav.navigate_to_room(room);
            }
        })));
        subscriptions.push(self.bus.on(EventKind::NavItemClicked, weak_handler(&weak, |nav, event| {
            if let AppEvent::NavItemClicked { page } = event {
                nav.navigate_to_page(page);
            }
        })));
        subscriptions.push(self.bus.on(
            EventKind::SeasonalTaskSelected,
            weak_handler(&weak, |nav, event| {
                if let AppEvent::SeasonalTaskSelected { season: Some(season) } = event {
                    nav.navigate_to_seasonal_task(season);
                }
            }),
        ));
        subscriptions.push(self.bus.on(EventKind::IssueSelected, weak_handler(&weak, |nav, event| {
            if let AppEvent::IssueSelected { title } = event {
                nav.navigate_to_issue(title);
            }
        })));
        subscriptions.push(self.bus.on(EventKind::KeyboardShortcut, weak_handler(&weak, |nav, event| {
            if let AppEvent::KeyboardShortcut { key, .. } = event {
                nav.handle_shortcut(key);
            }
        })));
    }

    pub fn unsubscribe(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl AppModule for NavigationManager {
    fn set_integration(self: Arc<Self>, _integration: &Integration) {
        self.subscribe();
    }
}

/// Adapt a handler that needs the manager to one holding only a weak ref.
fn weak_handler<F>(weak: &Weak<NavigationManager>, f: F) -> impl Fn(&AppEvent) + Send + Sync + 'static
where
    F: Fn(&NavigationManager, &AppEvent) + Send + Sync + 'static,
{
    let weak = Weak::clone(weak);
    move |event| {
        if let Some(nav) = weak.upgrade() {
            f(&nav, event);
        }
    }
}

fn push_history(history: &mut VecDeque<NavigationEntry>, action: NavigationAction) {
    history.push_back(NavigationEntry {
        action,
        timestamp: Utc::now(),
    });
    while history.len() > HISTORY_LIMIT {
        history.pop_front();
    }
}
