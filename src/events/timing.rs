//! Keyed throttle and debounce helpers
//!
//! Both are cached by a string key so repeated calls from the same call site
//! share state. Throttles drop calls inside the interval; debounces restart
//! their timer on every call and only the last call fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Fixed minimum interval between invocations. Extra calls are dropped.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Claim the next slot. Returns `false` while inside the interval.
    pub fn ready(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock();
        match *last {
            Some(prev) if now.duration_since(prev) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Run `f` if the throttle is open.
    pub fn call<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.ready().then(f)
    }
}

/// Throttles keyed by name. The first registration fixes the interval.
#[derive(Debug, Default)]
pub struct ThrottleCache {
    entries: Mutex<HashMap<String, Arc<Throttle>>>,
}

impl ThrottleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str, interval: Duration) -> Arc<Throttle> {
        let mut entries = self.entries.lock();
        Arc::clone(
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Throttle::new(interval))),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Whether a debounced call was deferred or ran on the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounced {
    Scheduled,
    /// No tokio runtime was available, so the call fired immediately.
    FiredNow,
}

struct Pending {
    generation: u64,
    task: JoinHandle<()>,
}

/// Keyed debouncer running its timers on the ambient tokio runtime.
#[derive(Clone, Default)]
pub struct Debouncer {
    pending: Arc<Mutex<HashMap<String, Pending>>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Debouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `f` after `delay`, cancelling any call pending under `key`.
    pub fn debounce<F>(&self, key: &str, delay: Duration, f: F) -> Debounced
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            self.cancel(key);
            f();
            return Debounced::FiredNow;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.remove(key) {
            previous.task.abort();
            trace!(key, "debounce restarted");
        }

        let shared = Arc::clone(&self.pending);
        let owned_key = key.to_string();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = shared.lock();
                if pending
                    .get(&owned_key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    pending.remove(&owned_key);
                }
            }
            f();
        });
        pending.insert(key.to_string(), Pending { generation, task });
        Debounced::Scheduled
    }

    /// Drop the call pending under `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        self.pending.lock().remove(key).is_some_and(|entry| {
            entry.task.abort();
            true
        })
    }

    pub fn cancel_all(&self) {
        for (_, entry) in self.pending.lock().drain() {
            entry.task.abort();
        }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
