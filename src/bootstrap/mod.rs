//! Module bootstrapper
//!
//! Modules are constructed one at a time, in a fixed declared order, by
//! factories that receive the shared [`Integration`] context. Each module
//! moves through `Pending -> Loading -> Loaded -> Initialized`; a load
//! failure marks that module `Failed`, leaves the rest `Pending` and aborts
//! the whole sequence.
//!
//! ```text
//!   validate order ──► load (factory, register) ──► wire hooks ──► APP_READY
//!        │                    │
//!        └── Dependency ──────┴── Load ──► FailureSink (once) ──► MODULE_FAILED
//! ```

pub mod graph;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::app::{AppState, SharedState};
use crate::config::Config;
use crate::diagnostics::FailureSink;
use crate::error::{GuideError, Result};
use crate::events::{AppEvent, EventBus};

pub use graph::ModuleGraph;
pub use registry::{LoadedModule, ModuleRegistry};

/// Optional wiring hooks, invoked once after every module has loaded.
pub trait AppModule: Send + Sync {
    fn set_integration(self: Arc<Self>, integration: &Integration) {
        let _ = integration;
    }

    fn set_app_state(&self, state: &AppState) {
        let _ = state;
    }

    fn set_config(&self, config: &Config) {
        let _ = config;
    }
}

/// Shared context handed to factories and wiring hooks.
#[derive(Clone)]
pub struct Integration {
    bus: EventBus,
    registry: Arc<ModuleRegistry>,
    state: SharedState,
    config: Arc<Config>,
}

impl fmt::Debug for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integration")
            .field("modules", &self.registry.names())
            .finish_non_exhaustive()
    }
}

impl Integration {
    #[must_use]
    pub fn new(bus: EventBus, state: SharedState, config: Arc<Config>) -> Self {
        Self {
            bus,
            registry: Arc::new(ModuleRegistry::new()),
            state,
            config,
        }
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn state(&self) -> &SharedState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    Pending,
    Loading,
    Loaded,
    Initialized,
    Failed,
}

impl ModuleState {
    /// At least `Loaded`.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded | Self::Initialized)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Initialized => "initialized",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: &'static str,
    pub depends_on: &'static [&'static str],
}

pub type ModuleFactory = Box<dyn FnOnce(&Integration) -> Result<LoadedModule> + Send>;

struct Slot {
    spec: ModuleSpec,
    state: ModuleState,
    factory: Option<ModuleFactory>,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleHealth {
    pub name: String,
    pub state: ModuleState,
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub initialized: bool,
    pub modules_loaded: bool,
    pub modules: Vec<ModuleHealth>,
}

/// Ordered, fail-fast module loader.
#[derive(Default)]
pub struct Bootstrapper {
    slots: Vec<Slot>,
    initialized: bool,
}

impl fmt::Debug for Bootstrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("health", &self.health())
            .finish()
    }
}

impl Bootstrapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next module in load order.
    #[must_use]
    pub fn module<F>(mut self, spec: ModuleSpec, factory: F) -> Self
    where
        F: FnOnce(&Integration) -> Result<LoadedModule> + Send + 'static,
    {
        self.slots.push(Slot {
            spec,
            state: ModuleState::Pending,
            factory: Some(Box::new(factory)),
            error: None,
        });
        self
    }

    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<ModuleState> {
        self.slots
            .iter()
            .find(|slot| slot.spec.name == name)
            .map(|slot| slot.state)
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn graph(&self) -> ModuleGraph {
        ModuleGraph::from_declared(
            self.slots
                .iter()
                .map(|slot| (slot.spec.name, slot.spec.depends_on.iter().copied())),
        )
    }

    /// Load and wire every module. The first failure is reported once to
    /// `failures`, announced on the bus and returned.
    pub fn start(&mut self, integration: &Integration, failures: &dyn FailureSink) -> Result<()> {
        info!(modules = self.slots.len(), "loading modules");

        if let Err(err) = self.graph().validate_declared_order() {
            let module = match &err {
                GuideError::Dependency { module, .. } => module.clone(),
                GuideError::CyclicDependency { cycle } => cycle.first().cloned().unwrap_or_default(),
                _ => String::new(),
            };
            return Err(self.fail(None, module, err, integration, failures));
        }

        for idx in 0..self.slots.len() {
            if let Err(err) = self.load(idx, integration) {
                let module = self.slots[idx].spec.name.to_string();
                return Err(self.fail(Some(idx), module, err, integration, failures));
            }
        }

        self.wire(integration);
        integration.state().mark_initialized();
        self.initialized = true;
        info!("all modules initialized");
        integration.bus().emit(AppEvent::AppReady {
            state: integration.state().snapshot(),
        });
        Ok(())
    }

    fn load(&mut self, idx: usize, integration: &Integration) -> Result<()> {
        let spec = self.slots[idx].spec;
        for dep in spec.depends_on {
            let ready = self.state_of(dep).is_some_and(ModuleState::is_loaded);
            if !ready {
                return Err(GuideError::Dependency {
                    module: spec.name.to_string(),
                    dependency: (*dep).to_string(),
                });
            }
        }

        let slot = &mut self.slots[idx];
        slot.state = ModuleState::Loading;
        debug!(module = spec.name, "loading module");
        let factory = slot
            .factory
            .take()
            .ok_or_else(|| GuideError::Load {
                module: spec.name.to_string(),
                reason: "module was already loaded".to_string(),
            })?;

        let module = factory(integration).map_err(|err| match err {
            load @ GuideError::Load { .. } => load,
            other => GuideError::Load {
                module: spec.name.to_string(),
                reason: other.to_string(),
            },
        })?;
        integration.registry().register(spec.name, module);
        self.slots[idx].state = ModuleState::Loaded;
        info!(module = spec.name, "module loaded");
        Ok(())
    }

    fn wire(&mut self, integration: &Integration) {
        let state = integration.state().snapshot();
        for slot in &mut self.slots {
            if let Some(module) = integration.registry().module(slot.spec.name) {
                let hooks = module.hooks();
                hooks.set_app_state(&state);
                hooks.set_config(integration.config());
                hooks.set_integration(integration);
            }
            slot.state = ModuleState::Initialized;
            debug!(module = slot.spec.name, "module initialized");
        }
    }

    fn fail(
        &mut self,
        idx: Option<usize>,
        module: String,
        err: GuideError,
        integration: &Integration,
        failures: &dyn FailureSink,
    ) -> GuideError {
        if let Some(idx) = idx {
            self.slots[idx].state = ModuleState::Failed;
            self.slots[idx].error = Some(err.to_string());
        }
        error!(module = %module, error = %err, "module initialization failed");
        failures.report_failure(&module, &err);
        integration.bus().emit(AppEvent::ModuleFailed {
            module,
            reason: err.to_string(),
        });
        err
    }

    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport {
            initialized: self.initialized,
            modules_loaded: self.slots.iter().all(|slot| slot.state.is_loaded()),
            modules: self
                .slots
                .iter()
                .map(|slot| ModuleHealth {
                    name: slot.spec.name.to_string(),
                    state: slot.state,
                    depends_on: slot.spec.depends_on.iter().map(|d| (*d).to_string()).collect(),
                    error: slot.error.clone(),
                })
                .collect(),
        }
    }
}
