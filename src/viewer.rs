//! Guide viewer: the open guide, favorites and step progress
//!
//! Opens on `GUIDE_REQUESTED`, closes on `ESCAPE_PRESSED`, and owns the
//! theme toggle since both persist through the same preferences.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{SharedState, StatePatch};
use crate::bootstrap::{AppModule, Integration};
use crate::core::{Category, Difficulty, Guide};
use crate::error::{GuideError, Result};
use crate::events::{AppEvent, EventBus, EventKind, Subscription};
use crate::search::SearchSystem;
use crate::storage::{Preferences, Theme};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideStep {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideTip {
    pub title: String,
    pub description: String,
}

fn step(title: &str, description: &str) -> GuideStep {
    GuideStep {
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn tip(title: &str, description: &str) -> GuideTip {
    GuideTip {
        title: title.to_string(),
        description: description.to_string(),
    }
}

/// Repair steps for `guide`. Kitchen drain guides get a dedicated sequence;
/// everything else gets the generic four steps around the guide content.
#[must_use]
pub fn generate_steps(guide: &Guide) -> Vec<GuideStep> {
    if guide.category == Category::Kitchen && guide.title.contains("Drain") {
        return vec![
            step(
                "Clear Visible Debris",
                "Remove any visible food particles or debris from the drain opening.",
            ),
            step(
                "Use Baking Soda Method",
                "Pour 1/2 cup baking soda down the drain, followed by 1/2 cup vinegar.",
            ),
            step(
                "Let it Work",
                "Wait 15 minutes for the mixture to break down the clog.",
            ),
            step(
                "Flush with Hot Water",
                "Pour several cups of hot water down the drain to clear the debris.",
            ),
        ];
    }

    let assess = if guide.content.trim().is_empty() {
        "Identify the root cause of the issue."
    } else {
        guide.content.as_str()
    };
    vec![
        step(
            "Safety First",
            "Turn off power/water if needed and gather safety equipment.",
        ),
        step("Assess the Problem", assess),
        step("Apply Solution", "Follow the repair procedure carefully."),
        step(
            "Test and Verify",
            "Ensure the problem is resolved and everything works properly.",
        ),
    ]
}

#[must_use]
pub fn generate_tips(guide: &Guide) -> Vec<GuideTip> {
    let mut tips = Vec::with_capacity(3);
    if guide.difficulty == Difficulty::Easy {
        tips.push(tip(
            "Perfect for Beginners",
            "This is a great DIY project that most homeowners can handle.",
        ));
    }
    tips.push(tip(
        "Prevention",
        "Regular maintenance prevents most issues from occurring.",
    ));
    tips.push(tip(
        "When to Call a Pro",
        "If you're unsure or the problem persists, consult a professional.",
    ));
    tips
}

/// Everything shown for one open guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideView {
    pub guide: Guide,
    pub steps: Vec<GuideStep>,
    pub tips: Vec<GuideTip>,
    pub favorite: bool,
    pub opened_steps: BTreeSet<u32>,
}

impl GuideView {
    /// Plain-text summary suitable for sharing.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!("{}\n{}", self.guide.title, self.guide.description)
    }
}

#[derive(Debug)]
pub struct GuideViewer {
    search: Arc<SearchSystem>,
    prefs: Preferences,
    bus: EventBus,
    shared: SharedState,
    current: Mutex<Option<GuideView>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl GuideViewer {
    pub fn new(search: Arc<SearchSystem>, prefs: Preferences, bus: EventBus, shared: SharedState) -> Self {
        Self {
            search,
            prefs,
            bus,
            shared,
            current: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Build the view of guide `id` without opening it.
    pub fn view(&self, id: &str) -> Result<GuideView> {
        let guide = self
            .search
            .guide(id)
            .ok_or_else(|| GuideError::GuideNotFound(id.to_string()))?;
        let favorite = self.prefs.favorites().iter().any(|fav| fav == id);
        let opened_steps = self.prefs.progress().remove(id).unwrap_or_default();
        Ok(GuideView {
            steps: generate_steps(&guide),
            tips: generate_tips(&guide),
            guide,
            favorite,
            opened_steps,
        })
    }

    /// Open guide `id`, replacing whatever was open.
    pub fn open_guide(&self, id: &str) -> Result<GuideView> {
        let view = self.view(id)?;
        *self.current.lock() = Some(view.clone());
        info!(guide = id, title = %view.guide.title, "opened guide");
        self.bus.emit(AppEvent::GuideOpened {
            guide_id: view.guide.id.clone(),
            title: view.guide.title.clone(),
        });
        Ok(view)
    }

    /// Close the open guide. Returns `false` when nothing was open.
    pub fn close_guide(&self) -> bool {
        let Some(closed) = self.current.lock().take() else {
            return false;
        };
        debug!(guide = %closed.guide.id, "closed guide");
        self.bus.emit(AppEvent::GuideClosed {
            guide_id: closed.guide.id,
        });
        true
    }

    #[must_use]
    pub fn current(&self) -> Option<GuideView> {
        self.current.lock().clone()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.current.lock().is_some()
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<String> {
        self.prefs.favorites()
    }

    /// Flip the favorite flag of the open guide.
    pub fn toggle_favorite(&self) -> Option<bool> {
        let id = self.current.lock().as_ref().map(|view| view.guide.id.clone())?;
        self.toggle_favorite_for(&id).ok()
    }

    /// Flip the favorite flag of guide `id`. Returns the new flag.
    pub fn toggle_favorite_for(&self, id: &str) -> Result<bool> {
        if self.search.guide(id).is_none() {
            return Err(GuideError::GuideNotFound(id.to_string()));
        }
        let mut favorites = self.prefs.favorites();
        let favorite = if let Some(position) = favorites.iter().position(|fav| fav == id) {
            favorites.remove(position);
            false
        } else {
            favorites.push(id.to_string());
            true
        };
        if !self.prefs.set_favorites(&favorites) {
            warn!(guide = id, "favorite change was not persisted");
        }
        if let Some(view) = self.current.lock().as_mut().filter(|view| view.guide.id == id) {
            view.favorite = favorite;
        }
        self.bus.emit(AppEvent::FavoriteToggled {
            guide_id: id.to_string(),
            favorite,
        });
        Ok(favorite)
    }

    /// Record that `step` (1-based) of the open guide was opened.
    pub fn track_step_open(&self, step: u32) -> bool {
        let mut current = self.current.lock();
        let Some(view) = current.as_mut() else {
            return false;
        };
        let in_range = usize::try_from(step).is_ok_and(|step| (1..=view.steps.len()).contains(&step));
        if !in_range {
            warn!(guide = %view.guide.id, step, "step out of range");
            return false;
        }
        if !view.opened_steps.insert(step) {
            return true;
        }
        let mut progress = self.prefs.progress();
        progress
            .entry(view.guide.id.clone())
            .or_default()
            .insert(step);
        debug!(guide = %view.guide.id, step, "step opened");
        self.prefs.set_progress(&progress)
    }

    /// Switch between light and dark, persist and announce the new theme.
    pub fn toggle_theme(&self) -> Theme {
        let theme = self.shared.snapshot().current_theme.toggled();
        if !self.prefs.set_theme(theme) {
            warn!(%theme, "theme change was not persisted");
        }
        self.shared.update(StatePatch::theme(theme));
        self.bus.emit(AppEvent::ThemeChanged { theme });
        theme
    }

    pub fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.push(self.bus.on(
            EventKind::GuideRequested,
            weak_handler(&weak, |viewer, event| {
                if let AppEvent::GuideRequested { guide_id } = event {
                    if let Err(err) = viewer.open_guide(guide_id) {
                        warn!(error = %err, "could not open requested guide");
                    }
                }
            }),
        ));
        subscriptions.push(self.bus.on(
            EventKind::EscapePressed,
            weak_handler(&weak, |viewer, _| {
                viewer.close_guide();
            }),
        ));
        subscriptions.push(self.bus.on(
            EventKind::ThemeToggleRequested,
            weak_handler(&weak, |viewer, _| {
                viewer.toggle_theme();
            }),
        ));
    }

    pub fn unsubscribe(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl AppModule for GuideViewer {
    fn set_integration(self: Arc<Self>, _integration: &Integration) {
        self.subscribe();
    }
}

fn weak_handler<F>(weak: &Weak<GuideViewer>, f: F) -> impl Fn(&AppEvent) + Send + Sync + 'static
where
    F: Fn(&GuideViewer, &AppEvent) + Send + Sync + 'static,
{
    let weak = Weak::clone(weak);
    move |event| {
        if let Some(viewer) = weak.upgrade() {
            f(&viewer, event);
        }
    }
}
