//! Application assembly
//!
//! The static module table below is the whole application: six modules in
//! load order, each with its declared dependencies and a factory that pulls
//! its collaborators out of the shared [`Integration`] context.

mod state;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::bootstrap::{AppModule, Bootstrapper, HealthReport, Integration, LoadedModule, ModuleRegistry, ModuleSpec};
use crate::config::Config;
use crate::core::Guide;
use crate::diagnostics::ErrorReporter;
use crate::error::Result;
use crate::events::{EventBus, EventDispatcher};
use crate::navigation::NavigationManager;
use crate::search::SearchSystem;
use crate::security::Sanitizer;
use crate::storage::Preferences;
use crate::viewer::GuideViewer;

pub use state::{AppState, SharedState, StatePatch, HOME_PAGE};

pub const ERROR_HANDLER: &str = "error_handler";
pub const DOM_SAFETY: &str = "dom_safety";
pub const EVENT_MANAGER: &str = "event_manager";
pub const NAVIGATION: &str = "navigation";
pub const SEARCH_SYSTEM: &str = "search_system";
pub const GUIDE_VIEWER: &str = "guide_viewer";

/// Load order and declared dependencies.
pub const MODULES: [ModuleSpec; 6] = [
    ModuleSpec {
        name: ERROR_HANDLER,
        depends_on: &[],
    },
    ModuleSpec {
        name: DOM_SAFETY,
        depends_on: &[ERROR_HANDLER],
    },
    ModuleSpec {
        name: EVENT_MANAGER,
        depends_on: &[ERROR_HANDLER, DOM_SAFETY],
    },
    ModuleSpec {
        name: NAVIGATION,
        depends_on: &[ERROR_HANDLER, DOM_SAFETY, EVENT_MANAGER],
    },
    ModuleSpec {
        name: SEARCH_SYSTEM,
        depends_on: &[ERROR_HANDLER, DOM_SAFETY, EVENT_MANAGER],
    },
    ModuleSpec {
        name: GUIDE_VIEWER,
        depends_on: &[ERROR_HANDLER, DOM_SAFETY, EVENT_MANAGER, SEARCH_SYSTEM],
    },
];

impl AppModule for ErrorReporter {
    fn set_integration(self: Arc<Self>, integration: &Integration) {
        self.attach(integration.bus());
    }
}

impl AppModule for Sanitizer {}

impl AppModule for EventDispatcher {}

/// A fully wired application.
pub struct App {
    integration: Integration,
    bootstrapper: Bootstrapper,
    reporter: Arc<ErrorReporter>,
    prefs: Preferences,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("integration", &self.integration)
            .field("bootstrapper", &self.bootstrapper)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Declare every module. Nothing is constructed until [`App::start`].
    #[must_use]
    pub fn new(config: Config, guides: Vec<Guide>, prefs: Preferences) -> Self {
        let bus = EventBus::new();
        let state = SharedState::with_state(
            bus.clone(),
            AppState {
                current_theme: prefs.theme(),
                ..AppState::default()
            },
        );
        let reporter = Arc::new(ErrorReporter::new(config.errors.clone()).with_preferences(prefs.clone()));
        let integration = Integration::new(bus, state, Arc::new(config));
        let bootstrapper = modules(Arc::clone(&reporter), guides, prefs.clone());
        Self {
            integration,
            bootstrapper,
            reporter,
            prefs,
        }
    }

    /// Load and wire every module. Failures are fatal.
    pub fn start(&mut self) -> Result<()> {
        self.bootstrapper
            .start(&self.integration, self.reporter.as_ref())?;
        info!(modules = self.integration.registry().len(), "application ready");
        Ok(())
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        self.integration.bus()
    }

    #[must_use]
    pub const fn state(&self) -> &SharedState {
        self.integration.state()
    }

    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        self.integration.registry()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.integration.config()
    }

    #[must_use]
    pub const fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    #[must_use]
    pub const fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    #[must_use]
    pub fn health(&self) -> HealthReport {
        self.bootstrapper.health()
    }

    pub fn sanitizer(&self) -> Result<Arc<Sanitizer>> {
        self.registry().require(DOM_SAFETY)
    }

    pub fn dispatcher(&self) -> Result<Arc<EventDispatcher>> {
        self.registry().require(EVENT_MANAGER)
    }

    pub fn navigation(&self) -> Result<Arc<NavigationManager>> {
        self.registry().require(NAVIGATION)
    }

    pub fn search(&self) -> Result<Arc<SearchSystem>> {
        self.registry().require(SEARCH_SYSTEM)
    }

    pub fn viewer(&self) -> Result<Arc<GuideViewer>> {
        self.registry().require(GUIDE_VIEWER)
    }

    /// Cancel pending timers and drop every bus subscription.
    pub fn shutdown(&self) {
        if let Ok(dispatcher) = self.dispatcher() {
            dispatcher.shutdown();
        }
        if let Ok(navigation) = self.navigation() {
            navigation.unsubscribe();
        }
        if let Ok(search) = self.search() {
            search.unsubscribe();
        }
        if let Ok(viewer) = self.viewer() {
            viewer.unsubscribe();
        }
        info!("application shut down");
    }
}

fn modules(reporter: Arc<ErrorReporter>, guides: Vec<Guide>, prefs: Preferences) -> Bootstrapper {
    let search_prefs = prefs.clone();
    Bootstrapper::new()
        .module(MODULES[0], move |_| Ok(LoadedModule::new(reporter)))
        .module(MODULES[1], |_| Ok(LoadedModule::new(Arc::new(Sanitizer::new()))))
        .module(MODULES[2], |integration| {
            let config = integration.config();
            Ok(LoadedModule::new(Arc::new(EventDispatcher::new(
                integration.bus().clone(),
                config.events.clone(),
                Duration::from_millis(config.search.debounce_ms),
            ))))
        })
        .module(MODULES[3], |integration| {
            Ok(LoadedModule::new(Arc::new(NavigationManager::new(
                integration.bus().clone(),
                integration.state().clone(),
            ))))
        })
        .module(MODULES[4], move |integration| {
            let sanitizer = integration.registry().require::<Sanitizer>(DOM_SAFETY)?;
            Ok(LoadedModule::new(Arc::new(SearchSystem::new(
                guides,
                sanitizer,
                search_prefs,
                integration.config().search.clone(),
                integration.bus().clone(),
                integration.state().clone(),
            ))))
        })
        .module(MODULES[5], move |integration| {
            let search = integration.registry().require::<SearchSystem>(SEARCH_SYSTEM)?;
            Ok(LoadedModule::new(Arc::new(GuideViewer::new(
                search,
                prefs,
                integration.bus().clone(),
                integration.state().clone(),
            ))))
        })
}
