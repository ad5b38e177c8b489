//! End-to-end sessions: host events in, application state and events out.

use std::time::Duration;

use homeguide::app::App;
use homeguide::config::Config;
use homeguide::core::fallback_guides;
use homeguide::dom::Element;
use homeguide::events::{AppEvent, Dispatch, EventKind, HostEvent, KeyInput};
use homeguide::storage::Theme;

use crate::fixture::{record, started_app, DiskPrefs};

fn typed(value: &str) -> HostEvent {
    HostEvent::Input {
        path: vec![Element::new("input").with_id("searchInput")],
        value: value.to_string(),
    }
}

fn click(element: Element) -> HostEvent {
    HostEvent::Click {
        path: vec![element, Element::new("main")],
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_searches_once() {
    let app = started_app();
    let seen = record(app.bus());
    let dispatcher = app.dispatcher().unwrap();

    for partial in ["le", "lea", "leak"] {
        assert_eq!(
            dispatcher.dispatch(typed(partial)),
            Dispatch::Deferred(EventKind::SearchQueryChanged)
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    let queries: Vec<String> = seen
        .lock()
        .iter()
        .filter_map(|event| match event {
            AppEvent::SearchQueryChanged { query } => Some(query.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(queries, ["leak"]);
    assert_eq!(app.state().snapshot().search_query, "leak");
    assert_eq!(app.search().unwrap().history(), ["leak"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_search() {
    let app = started_app();
    let seen = record(app.bus());
    app.dispatcher().unwrap().dispatch(typed("faucet"));
    app.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(!seen
        .lock()
        .iter()
        .any(|event| matches!(event, AppEvent::SearchResultsReady { .. })));
}

#[test]
fn room_click_then_filter_then_back() {
    let app = started_app();
    let dispatcher = app.dispatcher().unwrap();

    dispatcher.dispatch(click(
        Element::new("div").with_class("room-card").with_data("room", "bathroom"),
    ));
    assert_eq!(app.state().snapshot().current_room.as_deref(), Some("bathroom"));

    dispatcher.dispatch(click(
        Element::new("div").with_class("room-card").with_data("room", "office"),
    ));
    assert_eq!(app.state().snapshot().current_room.as_deref(), Some("office"));

    let navigation = app.navigation().unwrap();
    assert!(navigation.go_back());
    assert_eq!(navigation.current_state().current_room.as_deref(), Some("bathroom"));

    let search = app.search().unwrap();
    search.handle_query("water").unwrap();
    let view = search.select_filter("emergency").unwrap();
    assert!(!view.result_ids.is_empty());
    assert!(view.result_ids.iter().all(|id| id.starts_with("emergency-")));
    assert_eq!(app.state().snapshot().active_filters, ["emergency"]);
}

#[test]
fn preferences_survive_a_restart() {
    let disk = DiskPrefs::new();

    {
        let mut app = App::new(Config::default(), fallback_guides(), disk.open());
        app.start().unwrap();
        let dispatcher = app.dispatcher().unwrap();
        dispatcher.dispatch(click(Element::new("button").with_id("themeToggle")));
        dispatcher.dispatch(typed("gutter"));
        dispatcher.dispatch(click(
            Element::new("button")
                .with_class("view-guide-btn")
                .with_data("guide-id", "outdoor-001"),
        ));
        let viewer = app.viewer().unwrap();
        assert_eq!(viewer.toggle_favorite(), Some(true));
        assert!(viewer.track_step_open(1));
        app.shutdown();
    }

    let mut app = App::new(Config::default(), fallback_guides(), disk.open());
    app.start().unwrap();
    assert_eq!(app.state().snapshot().current_theme, Theme::Dark);
    assert_eq!(app.search().unwrap().history(), ["gutter"]);

    let view = app.viewer().unwrap().view("outdoor-001").unwrap();
    assert!(view.favorite);
    assert!(view.opened_steps.contains(&1));
}

#[test]
fn ctrl_shortcut_navigates_without_escape_side_effects() {
    let app = started_app();
    let seen = record(app.bus());
    app.dispatcher().unwrap().dispatch(HostEvent::KeyDown {
        path: Vec::new(),
        key: KeyInput::ctrl("Escape"),
    });
    let events = seen.lock();
    assert!(events
        .iter()
        .any(|event| matches!(event, AppEvent::KeyboardShortcut { ctrl: true, .. })));
    assert!(!events.iter().any(|event| matches!(event, AppEvent::EscapePressed)));
}

#[test]
fn panicking_subscriber_does_not_stop_delivery() {
    let app = started_app();
    app.bus().on(EventKind::RoomSelected, |_| panic!("bad subscriber"));
    app.bus().emit(AppEvent::RoomSelected {
        room: "kitchen".into(),
    });

    assert_eq!(app.state().snapshot().current_room.as_deref(), Some("kitchen"));
    let stats = app.reporter().stats();
    assert_eq!(stats.total, 1);
}
