use std::sync::Arc;

use homeguide::app::App;
use homeguide::config::Config;
use homeguide::core::{fallback_guides, Category, Difficulty, Guide};
use homeguide::events::{AppEvent, EventBus};
use homeguide::storage::{MemoryStore, Preferences, SqliteStore};
use parking_lot::Mutex;
use tempfile::TempDir;

/// A started application over the built-in guides and in-memory preferences.
pub fn started_app() -> App {
    let prefs = Preferences::new(Arc::new(MemoryStore::new()));
    let mut app = App::new(Config::default(), fallback_guides(), prefs);
    app.start().unwrap();
    app
}

/// Preferences backed by a SQLite file that outlives one application.
pub struct DiskPrefs {
    pub dir: TempDir,
}

impl DiskPrefs {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn open(&self) -> Preferences {
        let store = SqliteStore::open(self.dir.path().join("homeguide.db")).unwrap();
        Preferences::new(Arc::new(store))
    }
}

/// Record every event emitted on `bus`.
pub fn record(bus: &EventBus) -> Arc<Mutex<Vec<AppEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.on_any(move |event| sink.lock().push(event.clone()));
    seen
}

pub fn guide(id: &str, title: &str, category: Category, keywords: &[&str]) -> Guide {
    Guide {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        content: String::new(),
        category,
        difficulty: Difficulty::Easy,
        time_estimate: String::new(),
        tools: Vec::new(),
        keywords: keywords.iter().map(ToString::to_string).collect(),
    }
}
