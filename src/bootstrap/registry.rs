//! Live module instances by name

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{GuideError, Result};

use super::AppModule;

/// A loaded module, kept both as its wiring hooks and as `Any` so callers
/// can recover the concrete type.
#[derive(Clone)]
pub struct LoadedModule {
    hooks: Arc<dyn AppModule>,
    instance: Arc<dyn Any + Send + Sync>,
}

impl LoadedModule {
    pub fn new<T: AppModule + 'static>(instance: Arc<T>) -> Self {
        Self {
            hooks: Arc::clone(&instance) as Arc<dyn AppModule>,
            instance,
        }
    }

    #[must_use]
    pub fn hooks(&self) -> Arc<dyn AppModule> {
        Arc::clone(&self.hooks)
    }

    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.instance).downcast::<T>().ok()
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule").finish_non_exhaustive()
    }
}

/// Name -> module, in registration order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<Vec<(String, LoadedModule)>>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `name`, replacing any previous entry.
    pub fn register(&self, name: &str, module: LoadedModule) {
        let mut modules = self.modules.write();
        if let Some(slot) = modules.iter_mut().find(|(existing, _)| existing == name) {
            slot.1 = module;
        } else {
            modules.push((name.to_string(), module));
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().iter().any(|(existing, _)| existing == name)
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<LoadedModule> {
        self.modules
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, module)| module.clone())
    }

    /// Typed lookup. `None` when absent or of another type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.module(name).and_then(|module| module.downcast::<T>())
    }

    /// Typed lookup that fails with [`GuideError::ModuleNotFound`].
    pub fn require<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.get(name)
            .ok_or_else(|| GuideError::ModuleNotFound(name.to_string()))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.modules
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}
