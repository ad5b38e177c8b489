//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Module bootstrap errors
//! - 2xx: Guide catalog errors
//! - 3xx: Config errors
//! - 4xx: Search errors
//! - 5xx: Network errors
//! - 6xx: Storage errors
//! - 7xx: Render errors
//! - 8xx: Validation errors
//! - 9xx: Internal and runtime errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ModuleLoadFailed` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Module bootstrap errors (1xx)
    // ========================================
    /// E101: A module factory failed while loading
    ModuleLoadFailed,
    /// E102: A module's declared dependency has not completed loading
    ModuleDependencyUnmet,
    /// E103: Declared module dependencies form a cycle
    ModuleCyclicDependency,
    /// E104: A module name is unknown to the registry
    ModuleNotFound,

    // ========================================
    // Catalog errors (2xx)
    // ========================================
    /// E201: Requested guide is not in the catalog
    GuideNotFound,
    /// E202: Guide payload could not be parsed
    PayloadInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Query is too short or otherwise unusable
    SearchQueryInvalid,
    /// E402: Search returned zero results
    SearchNoResults,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Payload request failed
    NetworkRequestFailed,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Preference store rejected a write
    StorageWriteError,
    /// E602: Database operation failed
    DatabaseError,
    /// E603: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Render errors (7xx)
    // ========================================
    /// E701: Content rejected by the sanitizer allow-list
    RenderBlocked,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Caller-supplied selector, identifier or handler was malformed
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Uncaught runtime failure captured by the reporter
    RuntimeError,
    /// E902: Generic not found (catch-all)
    NotFound,
    /// E903: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `ModuleLoadFailed` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ModuleLoadFailed => 101,
            Self::ModuleDependencyUnmet => 102,
            Self::ModuleCyclicDependency => 103,
            Self::ModuleNotFound => 104,

            Self::GuideNotFound => 201,
            Self::PayloadInvalid => 202,

            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,

            Self::SearchQueryInvalid => 401,
            Self::SearchNoResults => 402,

            Self::NetworkRequestFailed => 501,

            Self::StorageWriteError => 601,
            Self::DatabaseError => 602,
            Self::SerializationError => 603,

            Self::RenderBlocked => 701,

            Self::ValidationFailed => 801,

            Self::RuntimeError => 901,
            Self::NotFound => 902,
            Self::IoError => 903,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ModuleLoadFailed => "Startup aborted. Check the log output for the failing module and restart",
            Self::ModuleDependencyUnmet => "Reorder the module table so every dependency is declared before its dependents",
            Self::ModuleCyclicDependency => "Break the cycle by removing one of the declared module dependencies",
            Self::ModuleNotFound => "Run `homeguide modules` to list registered modules",

            Self::GuideNotFound => "Run `homeguide search <query>` to find guide identifiers",
            Self::PayloadInvalid => "The guide payload must be a JSON object with a `guides` array",

            Self::ConfigInvalid => "Check TOML syntax in the config file and HOMEGUIDE_* environment variables",
            Self::ConfigMissingRequired => "Set the missing value in config.toml or through its HOMEGUIDE_* variable",

            Self::SearchQueryInvalid => "Queries need at least two characters",
            Self::SearchNoResults => "Try different keywords, or reset the filter with --filter all",

            Self::NetworkRequestFailed => "Check connectivity to the catalog source. Built-in guides are used meanwhile",

            Self::StorageWriteError => "The preference store is full or read-only. Clear history or favorites",
            Self::DatabaseError => "The preference database may be corrupted. Remove it to start fresh",
            Self::SerializationError => "The stored data format may be corrupted. Check input data for validity",

            Self::RenderBlocked => "Remove scripts, inline handlers and unsafe URL schemes from the content",

            Self::ValidationFailed => "Check the identifier or selector passed to the operation",

            Self::RuntimeError => "An unexpected error occurred. Run `homeguide errors` for the recorded log",
            Self::NotFound => "The requested resource was not found. Check the path or identifier",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ModuleNotFound
            | Self::GuideNotFound
            | Self::PayloadInvalid
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::SearchQueryInvalid
            | Self::SearchNoResults
            | Self::NetworkRequestFailed
            | Self::StorageWriteError
            | Self::RenderBlocked
            | Self::ValidationFailed
            | Self::NotFound
            | Self::IoError => true,

            Self::ModuleLoadFailed
            | Self::ModuleDependencyUnmet
            | Self::ModuleCyclicDependency
            | Self::DatabaseError
            | Self::SerializationError
            | Self::RuntimeError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "module",
            2 => "catalog",
            3 => "config",
            4 => "search",
            5 => "network",
            6 => "storage",
            7 => "render",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ModuleLoadFailed,
            Self::ModuleDependencyUnmet,
            Self::ModuleCyclicDependency,
            Self::ModuleNotFound,
            Self::GuideNotFound,
            Self::PayloadInvalid,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SearchQueryInvalid,
            Self::SearchNoResults,
            Self::NetworkRequestFailed,
            Self::StorageWriteError,
            Self::DatabaseError,
            Self::SerializationError,
            Self::RenderBlocked,
            Self::ValidationFailed,
            Self::RuntimeError,
            Self::NotFound,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
