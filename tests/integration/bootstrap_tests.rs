use std::sync::Arc;

use homeguide::app::{SharedState, MODULES};
use homeguide::bootstrap::{Bootstrapper, Integration, LoadedModule, ModuleSpec, ModuleState};
use homeguide::config::Config;
use homeguide::diagnostics::{ErrorReporter, MODULE_LOAD_ERROR};
use homeguide::error::{ErrorCode, GuideError};
use homeguide::events::{AppEvent, EventBus};
use homeguide::security::Sanitizer;

use crate::fixture::{record, started_app};

fn integration() -> Integration {
    let bus = EventBus::new();
    let state = SharedState::new(bus.clone());
    Integration::new(bus, state, Arc::new(Config::default()))
}

fn sanitizer_module(_: &Integration) -> homeguide::Result<LoadedModule> {
    Ok(LoadedModule::new(Arc::new(Sanitizer::new())))
}

#[test]
fn full_stack_announces_ready_with_state() {
    let app = started_app();
    let health = app.health();
    assert!(health.initialized && health.modules_loaded);
    assert_eq!(health.modules.len(), MODULES.len());
    assert!(app.state().snapshot().initialized);
}

#[test]
fn failing_factory_stops_the_sequence() {
    let integration = integration();
    let seen = record(integration.bus());
    let reporter = ErrorReporter::new(Config::default().errors);

    let mut boot = Bootstrapper::new()
        .module(ModuleSpec { name: "a", depends_on: &[] }, sanitizer_module)
        .module(ModuleSpec { name: "b", depends_on: &["a"] }, |_| {
            Err(GuideError::Runtime("disk on fire".into()))
        })
        .module(ModuleSpec { name: "c", depends_on: &["b"] }, sanitizer_module);

    let err = boot.start(&integration, &reporter).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleLoadFailed);
    assert!(err.is_fatal());

    assert_eq!(boot.state_of("a"), Some(ModuleState::Loaded));
    assert_eq!(boot.state_of("b"), Some(ModuleState::Failed));
    assert_eq!(boot.state_of("c"), Some(ModuleState::Pending));
    assert!(!integration.registry().contains("c"));

    let log = reporter.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, MODULE_LOAD_ERROR);

    let events = seen.lock();
    assert!(events
        .iter()
        .any(|event| matches!(event, AppEvent::ModuleFailed { module, .. } if module == "b")));
    assert!(!events.iter().any(|event| matches!(event, AppEvent::AppReady { .. })));
}

#[test]
fn dependency_declared_later_is_rejected_before_loading() {
    let integration = integration();
    let reporter = ErrorReporter::new(Config::default().errors);
    let mut boot = Bootstrapper::new()
        .module(ModuleSpec { name: "viewer", depends_on: &["search"] }, sanitizer_module)
        .module(ModuleSpec { name: "search", depends_on: &[] }, sanitizer_module);

    let err = boot.start(&integration, &reporter).unwrap_err();
    assert!(matches!(err, GuideError::Dependency { ref module, ref dependency }
        if module == "viewer" && dependency == "search"));
    assert_eq!(boot.state_of("search"), Some(ModuleState::Pending));
    assert!(integration.registry().names().is_empty());
}

#[test]
fn typed_lookup_of_missing_module_fails() {
    let app = started_app();
    let err = app.registry().require::<Sanitizer>("no_such_module").unwrap_err();
    assert_eq!(err.code(), ErrorCode::ModuleNotFound);
}
