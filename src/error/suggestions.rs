//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints built
//! from the error's JSON context.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a suggestion for an error, using context when it is available.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::GuideNotFound => suggest_guide_not_found(context),
        ErrorCode::ModuleLoadFailed => suggest_module_load_failed(context),
        ErrorCode::ModuleDependencyUnmet => suggest_dependency_unmet(context),
        ErrorCode::ModuleCyclicDependency => suggest_cyclic(context),
        ErrorCode::ConfigMissingRequired => suggest_missing_config(context),
        _ => code.suggestion().to_string(),
    }
}

fn str_field<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_guide_not_found(context: Option<&Value>) -> String {
    match str_field(context, "guide_id") {
        Some(id) => format!(
            "Guide '{id}' is not in the catalog. Try:\n  - `homeguide search {id}` to find similar guides\n  - `homeguide filters` to list categories"
        ),
        None => ErrorCode::GuideNotFound.suggestion().to_string(),
    }
}

fn suggest_module_load_failed(context: Option<&Value>) -> String {
    match str_field(context, "module") {
        Some(module) => format!(
            "Module '{module}' failed to load and startup was aborted. Run with -vv to see its log output"
        ),
        None => ErrorCode::ModuleLoadFailed.suggestion().to_string(),
    }
}

fn suggest_dependency_unmet(context: Option<&Value>) -> String {
    match (
        str_field(context, "module"),
        str_field(context, "dependency"),
    ) {
        (Some(module), Some(dep)) => format!(
            "Module '{module}' requires '{dep}'. Declare '{dep}' earlier in the module table, or register it"
        ),
        _ => ErrorCode::ModuleDependencyUnmet.suggestion().to_string(),
    }
}

fn suggest_cyclic(context: Option<&Value>) -> String {
    let cycle = context
        .and_then(|c| c.get("cycle"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        });
    match cycle {
        Some(chain) if !chain.is_empty() => {
            format!("Dependency cycle: {chain}. Remove one of these edges")
        }
        _ => ErrorCode::ModuleCyclicDependency.suggestion().to_string(),
    }
}

fn suggest_missing_config(context: Option<&Value>) -> String {
    match str_field(context, "config_key") {
        Some(key) => {
            let env = format!("HOMEGUIDE_{}", key.replace('.', "_").to_uppercase());
            format!("Set `{key}` in config.toml or export {env}")
        }
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guide_not_found_mentions_id() {
        let ctx = json!({ "guide_id": "k9" });
        let s = suggest_for_error(ErrorCode::GuideNotFound, Some(&ctx));
        assert!(s.contains("homeguide search k9"));
    }

    #[test]
    fn falls_back_to_static_suggestion() {
        let s = suggest_for_error(ErrorCode::GuideNotFound, None);
        assert_eq!(s, ErrorCode::GuideNotFound.suggestion());
        let s = suggest_for_error(ErrorCode::IoError, Some(&json!({})));
        assert_eq!(s, ErrorCode::IoError.suggestion());
    }

    #[test]
    fn cycle_chain_is_joined() {
        let ctx = json!({ "cycle": ["a", "b", "a"] });
        let s = suggest_for_error(ErrorCode::ModuleCyclicDependency, Some(&ctx));
        assert!(s.contains("a -> b -> a"));
    }

    #[test]
    fn missing_config_names_env_var() {
        let ctx = json!({ "config_key": "catalog.source" });
        let s = suggest_for_error(ErrorCode::ConfigMissingRequired, Some(&ctx));
        assert!(s.contains("HOMEGUIDE_CATALOG_SOURCE"));
    }
}
