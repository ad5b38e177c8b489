//! Runtime error reporting
//!
//! Captured runtime errors are classified by severity, kept in a capped
//! most-recent-first log, persisted (first few entries) through
//! [`Preferences`], and optionally surfaced as a notification. Notifications
//! are throttled per error type and expire after a fixed time to live.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::ErrorsConfig;
use crate::error::GuideError;
use crate::events::{AppEvent, EventBus};
use crate::storage::prefs::ERROR_LOG_KEY;
use crate::storage::Preferences;

pub const HANDLER_PANIC: &str = "Handler Panic";
pub const MODULE_LOAD_ERROR: &str = "Module Load Error";
pub const MANUAL_REPORT: &str = "Manual Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity heuristic over the error type and message.
#[must_use]
pub fn classify(kind: &str, message: &str) -> Severity {
    if kind == "TypeError"
        || message.contains("Cannot read property")
        || message.contains("is not a function")
    {
        Severity::High
    } else if kind == "ReferenceError" || kind == "Promise Rejection" {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Plain-language message shown to the user for an error.
#[must_use]
pub fn user_message(kind: &str, message: &str) -> &'static str {
    let kind = kind.to_lowercase();
    let message = message.to_lowercase();

    if message.contains("network") || message.contains("fetch") {
        return "Please check your internet connection and try again.";
    }
    if message.contains("not found") || kind.contains("resource") {
        return "Some content failed to load. Please refresh the page.";
    }
    match kind.as_str() {
        "javascript error" | "typeerror" => "A technical error occurred. Please refresh the page.",
        "promise rejection" => "An operation failed to complete. Please try again.",
        _ => "Something went wrong. Please refresh the page or try again later.",
    }
}

/// An error as captured, before processing.
#[derive(Debug, Clone, Default)]
pub struct RuntimeError {
    pub kind: String,
    pub message: String,
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub stack: Option<String>,
    pub context: Value,
}

impl RuntimeError {
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_location(mut self, source: impl Into<String>, line: u32, column: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Wrap a crate error, keeping its structured context.
    #[must_use]
    pub fn from_guide_error(kind: impl Into<String>, err: &GuideError) -> Self {
        let mut captured = Self::new(kind, err.to_string());
        captured.context = serde_json::json!({
            "code": err.code().code_string(),
            "detail": err.context(),
        });
        captured
    }
}

/// A processed, logged error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub severity: Severity,
    pub user_message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub context: Value,
}

/// A dismissible notification for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub report_id: String,
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub notifications_active: usize,
    pub user_notifications: bool,
}

/// Receives fatal failures from other components.
pub trait FailureSink: Send + Sync {
    fn report_failure(&self, module: &str, err: &GuideError);
}

/// Captures, classifies, logs and surfaces runtime errors.
pub struct ErrorReporter {
    config: ErrorsConfig,
    enabled: AtomicBool,
    log: Mutex<VecDeque<ErrorReport>>,
    last_shown: Mutex<HashMap<String, DateTime<Utc>>>,
    notifications: Mutex<Vec<Notification>>,
    prefs: Option<Preferences>,
    bus: Mutex<Option<EventBus>>,
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("logged", &self.log.lock().len())
            .field("enabled", &self.enabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ErrorReporter {
    #[must_use]
    pub fn new(config: ErrorsConfig) -> Self {
        Self {
            config,
            enabled: AtomicBool::new(true),
            log: Mutex::new(VecDeque::new()),
            last_shown: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
            prefs: None,
            bus: Mutex::new(None),
        }
    }

    /// Persist through `prefs`, restoring any previously saved entries.
    #[must_use]
    pub fn with_preferences(mut self, prefs: Preferences) -> Self {
        let restored: Vec<ErrorReport> = prefs.get_json(ERROR_LOG_KEY).unwrap_or_default();
        if !restored.is_empty() {
            debug!(entries = restored.len(), "restored error log");
        }
        *self.log.get_mut() = restored.into_iter().take(self.config.max_log_entries).collect();
        self.prefs = Some(prefs);
        self
    }

    /// Route handler panics on `bus` here and announce reports on it.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) {
        let reporter: Weak<Self> = Arc::downgrade(self);
        bus.set_panic_sink(Arc::new(move |kind, message| {
            if let Some(reporter) = reporter.upgrade() {
                reporter.report(
                    RuntimeError::new(HANDLER_PANIC, message)
                        .with_context(serde_json::json!({ "event": kind.name() })),
                );
            }
        }));
        *self.bus.lock() = Some(bus.clone());
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn report(&self, error: RuntimeError) -> Option<ErrorReport> {
        self.report_at(error, Utc::now())
    }

    /// Report an error raised deliberately by application code.
    pub fn report_manual(&self, message: impl Into<String>, context: Value) -> Option<ErrorReport> {
        self.report(RuntimeError::new(MANUAL_REPORT, message).with_context(context))
    }

    /// Process `error` as if it happened at `now`. Returns `None` while
    /// reporting is disabled.
    pub fn report_at(&self, error: RuntimeError, now: DateTime<Utc>) -> Option<ErrorReport> {
        if !self.enabled.load(Ordering::Relaxed) {
            return None;
        }

        let report = self.process(error, now);
        match report.severity {
            Severity::High => error!(id = %report.id, kind = %report.kind, message = %report.message, "runtime error"),
            Severity::Medium => warn!(id = %report.id, kind = %report.kind, message = %report.message, "runtime error"),
            Severity::Low => info!(id = %report.id, kind = %report.kind, message = %report.message, "runtime error"),
        }

        self.log_report(report.clone());
        if self.should_notify(&report, now) {
            self.notify(&report, now);
        }

        let bus = self.bus.lock().clone();
        if let Some(bus) = bus {
            bus.emit(AppEvent::ErrorReported {
                id: report.id.clone(),
                kind: report.kind.clone(),
                message: report.message.clone(),
                severity: report.severity,
            });
        }
        Some(report)
    }

    fn process(&self, error: RuntimeError, now: DateTime<Utc>) -> ErrorReport {
        let kind = if error.kind.is_empty() {
            "Unknown Error".to_string()
        } else {
            error.kind
        };
        let message = if error.message.is_empty() {
            "An unknown error occurred".to_string()
        } else {
            error.message
        };
        let simple = uuid::Uuid::new_v4().simple().to_string();
        ErrorReport {
            id: format!("ERR_{}_{}", now.timestamp_millis(), &simple[..9]),
            timestamp: now,
            severity: classify(&kind, &message),
            user_message: user_message(&kind, &message).to_string(),
            kind,
            message,
            source: error.source,
            line: error.line,
            column: error.column,
            stack: error.stack,
            context: error.context,
        }
    }

    fn log_report(&self, report: ErrorReport) {
        let persisted: Vec<ErrorReport> = {
            let mut log = self.log.lock();
            log.push_front(report);
            log.truncate(self.config.max_log_entries);
            log.iter()
                .take(self.config.persisted_entries)
                .cloned()
                .collect()
        };
        if let Some(prefs) = &self.prefs {
            // A full store only loses the persisted copy.
            prefs.set_json(ERROR_LOG_KEY, &persisted);
        }
    }

    fn should_notify(&self, report: &ErrorReport, now: DateTime<Utc>) -> bool {
        if !self.config.user_notifications || report.severity == Severity::Low {
            return false;
        }
        let cooldown = seconds(self.config.notification_cooldown_secs);
        let mut last_shown = self.last_shown.lock();
        if let Some(shown) = last_shown.get(&report.kind) {
            if now.signed_duration_since(*shown) < cooldown {
                debug!(kind = %report.kind, "notification suppressed by cooldown");
                return false;
            }
        }
        last_shown.insert(report.kind.clone(), now);
        true
    }

    fn notify(&self, report: &ErrorReport, now: DateTime<Utc>) {
        let notification = Notification {
            report_id: report.id.clone(),
            kind: report.kind.clone(),
            severity: report.severity,
            message: report.user_message.clone(),
            expires_at: now
                .checked_add_signed(seconds(self.config.notification_ttl_secs))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let mut notifications = self.notifications.lock();
        notifications.retain(|existing| existing.expires_at > now);
        notifications.push(notification);
    }

    /// Notifications still visible at `now`.
    #[must_use]
    pub fn active_notifications(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut notifications = self.notifications.lock();
        notifications.retain(|notification| notification.expires_at > now);
        notifications.clone()
    }

    /// Dismiss the notification for `report_id`.
    pub fn dismiss(&self, report_id: &str) -> bool {
        let mut notifications = self.notifications.lock();
        let before = notifications.len();
        notifications.retain(|notification| notification.report_id != report_id);
        notifications.len() != before
    }

    /// Most-recent-first copy of the in-memory log.
    #[must_use]
    pub fn log(&self) -> Vec<ErrorReport> {
        self.log.lock().iter().cloned().collect()
    }

    /// Clear the in-memory log, notifications and persisted copy.
    pub fn clear(&self) {
        self.log.lock().clear();
        self.notifications.lock().clear();
        self.last_shown.lock().clear();
        if let Some(prefs) = &self.prefs {
            prefs.remove(ERROR_LOG_KEY);
        }
    }

    #[must_use]
    pub fn stats(&self) -> ErrorStats {
        let log = self.log.lock();
        let mut stats = ErrorStats {
            total: log.len(),
            notifications_active: self.notifications.lock().len(),
            user_notifications: self.config.user_notifications,
            ..ErrorStats::default()
        };
        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            stats.by_severity.insert(severity, 0);
        }
        for report in log.iter() {
            *stats.by_type.entry(report.kind.clone()).or_default() += 1;
            *stats.by_severity.entry(report.severity).or_default() += 1;
        }
        stats
    }
}

impl FailureSink for ErrorReporter {
    fn report_failure(&self, module: &str, err: &GuideError) {
        self.report(
            RuntimeError::from_guide_error(MODULE_LOAD_ERROR, err)
                .with_location(module, 0, 0),
        );
    }
}

fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
