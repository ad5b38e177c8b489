use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GuideError, Result};

/// Default location of the guide payload, relative to the working directory.
pub const DEFAULT_SOURCE: &str = "content/guides.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
    #[serde(default)]
    pub app: AppConfig,
}

impl Config {
    /// Load configuration for `root`, reading overrides from the process
    /// environment.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        Self::load_with(explicit_path, root, |key| std::env::var(key).ok())
    }

    /// Load configuration with a caller-supplied environment lookup.
    ///
    /// An explicit file (argument or `HOMEGUIDE_CONFIG`) replaces the
    /// global/project layering entirely.
    pub fn load_with<F>(explicit_path: Option<&Path>, root: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| lookup("HOMEGUIDE_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(GuideError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&lookup)?;

        Ok(config)
    }

    /// Parse a config from TOML text on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| GuideError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("homeguide/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| GuideError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| GuideError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.catalog {
            self.catalog.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.events {
            self.events.merge(patch);
        }
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.errors {
            self.errors.merge(patch);
        }
        if let Some(patch) = patch.app {
            self.app.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = env_string(lookup, "HOMEGUIDE_SOURCE") {
            self.catalog.source = source;
        }
        if let Some(value) = env_parse(lookup, "HOMEGUIDE_TIMEOUT_SECS")? {
            self.catalog.timeout_secs = value;
        }
        if let Some(value) = env_parse(lookup, "HOMEGUIDE_MAX_RESULTS")? {
            self.search.max_results = value;
        }
        if let Some(value) = env_parse(lookup, "HOMEGUIDE_DEBOUNCE_MS")? {
            self.search.debounce_ms = value;
        }
        if let Some(value) = env_parse(lookup, "HOMEGUIDE_HISTORY_CAPACITY")? {
            self.search.history_capacity = value;
        }
        if let Some(path) = env_string(lookup, "HOMEGUIDE_DB") {
            self.storage.database = Some(path);
        }
        if let Some(value) = env_bool(lookup, "HOMEGUIDE_NOTIFICATIONS") {
            self.errors.user_notifications = value;
        }
        if let Some(value) = env_bool(lookup, "HOMEGUIDE_DEBUG") {
            self.app.debug = value;
        }
        if let Some(value) = env_bool(lookup, "HOMEGUIDE_OFFLINE") {
            self.app.offline_mode = value;
        }
        Ok(())
    }

    /// Path of the preference database, resolved against `root`.
    #[must_use]
    pub fn database_path(&self, root: &Path) -> PathBuf {
        self.storage
            .database
            .as_deref()
            .map_or_else(|| root.join("homeguide.db"), PathBuf::from)
    }
}

/// Resolve the data root: `HOMEGUIDE_ROOT`, else the platform data dir.
#[must_use]
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOMEGUIDE_ROOT").ok().map(PathBuf::from))
        .or_else(|| dirs::data_dir().map(|dir| dir.join("homeguide")))
        .unwrap_or_else(|| PathBuf::from(".homeguide"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// `http(s)://` URL or file path of the guide payload.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl CatalogConfig {
    fn merge(&mut self, patch: CatalogPatch) {
        if let Some(value) = patch.source {
            self.source = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub min_query_len: usize,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub max_suggestions: usize,
    #[serde(default)]
    pub debounce_ms: u64,
    #[serde(default)]
    pub history_capacity: usize,
    #[serde(default)]
    pub highlight_class: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            max_results: 20,
            max_suggestions: 5,
            debounce_ms: 300,
            history_capacity: 20,
            highlight_class: "search-highlight".to_string(),
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.min_query_len {
            self.min_query_len = value;
        }
        if let Some(value) = patch.max_results {
            self.max_results = value;
        }
        if let Some(value) = patch.max_suggestions {
            self.max_suggestions = value;
        }
        if let Some(value) = patch.debounce_ms {
            self.debounce_ms = value;
        }
        if let Some(value) = patch.history_capacity {
            self.history_capacity = value;
        }
        if let Some(value) = patch.highlight_class {
            self.highlight_class = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub resize_throttle_ms: u64,
    #[serde(default)]
    pub touch_move_throttle_ms: u64,
    #[serde(default)]
    pub tap_max_ms: u64,
    #[serde(default)]
    pub long_press_ms: u64,
    #[serde(default)]
    pub swipe_threshold_px: f64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            resize_throttle_ms: 100,
            touch_move_throttle_ms: 16,
            tap_max_ms: 200,
            long_press_ms: 500,
            swipe_threshold_px: 50.0,
        }
    }
}

impl EventsConfig {
    fn merge(&mut self, patch: EventsPatch) {
        if let Some(value) = patch.resize_throttle_ms {
            self.resize_throttle_ms = value;
        }
        if let Some(value) = patch.touch_move_throttle_ms {
            self.touch_move_throttle_ms = value;
        }
        if let Some(value) = patch.tap_max_ms {
            self.tap_max_ms = value;
        }
        if let Some(value) = patch.long_press_ms {
            self.long_press_ms = value;
        }
        if let Some(value) = patch.swipe_threshold_px {
            self.swipe_threshold_px = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Preference database path. Defaults to `<root>/homeguide.db`.
    #[serde(default)]
    pub database: Option<String>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.database {
            self.database = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsConfig {
    #[serde(default)]
    pub max_log_entries: usize,
    #[serde(default)]
    pub persisted_entries: usize,
    #[serde(default)]
    pub notification_cooldown_secs: u64,
    #[serde(default)]
    pub notification_ttl_secs: u64,
    #[serde(default)]
    pub user_notifications: bool,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            max_log_entries: 100,
            persisted_entries: 10,
            notification_cooldown_secs: 30,
            notification_ttl_secs: 10,
            user_notifications: true,
        }
    }
}

impl ErrorsConfig {
    fn merge(&mut self, patch: ErrorsPatch) {
        if let Some(value) = patch.max_log_entries {
            self.max_log_entries = value;
        }
        if let Some(value) = patch.persisted_entries {
            self.persisted_entries = value;
        }
        if let Some(value) = patch.notification_cooldown_secs {
            self.notification_cooldown_secs = value;
        }
        if let Some(value) = patch.notification_ttl_secs {
            self.notification_ttl_secs = value;
        }
        if let Some(value) = patch.user_notifications {
            self.user_notifications = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub offline_mode: bool,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default)]
    pub animations_enabled: bool,
    #[serde(default)]
    pub cache_expiry_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            offline_mode: false,
            auto_save: true,
            animations_enabled: true,
            cache_expiry_hours: 24,
        }
    }
}

impl AppConfig {
    fn merge(&mut self, patch: AppPatch) {
        if let Some(value) = patch.debug {
            self.debug = value;
        }
        if let Some(value) = patch.offline_mode {
            self.offline_mode = value;
        }
        if let Some(value) = patch.auto_save {
            self.auto_save = value;
        }
        if let Some(value) = patch.animations_enabled {
            self.animations_enabled = value;
        }
        if let Some(value) = patch.cache_expiry_hours {
            self.cache_expiry_hours = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub catalog: Option<CatalogPatch>,
    pub search: Option<SearchPatch>,
    pub events: Option<EventsPatch>,
    pub storage: Option<StoragePatch>,
    pub errors: Option<ErrorsPatch>,
    pub app: Option<AppPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogPatch {
    pub source: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub min_query_len: Option<usize>,
    pub max_results: Option<usize>,
    pub max_suggestions: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub history_capacity: Option<usize>,
    pub highlight_class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EventsPatch {
    pub resize_throttle_ms: Option<u64>,
    pub touch_move_throttle_ms: Option<u64>,
    pub tap_max_ms: Option<u64>,
    pub long_press_ms: Option<u64>,
    pub swipe_threshold_px: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorsPatch {
    pub max_log_entries: Option<usize>,
    pub persisted_entries: Option<usize>,
    pub notification_cooldown_secs: Option<u64>,
    pub notification_ttl_secs: Option<u64>,
    pub user_notifications: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AppPatch {
    pub debug: Option<bool>,
    pub offline_mode: Option<bool>,
    pub auto_save: Option<bool>,
    pub animations_enabled: Option<bool>,
    pub cache_expiry_hours: Option<u64>,
}

fn env_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn env_bool<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_parse<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| GuideError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
