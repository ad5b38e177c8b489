//! Error handling for homeguide.
//!
//! This module provides:
//! - [`GuideError`]: The main error enum for all homeguide operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for homeguide operations.
#[derive(Error, Debug)]
pub enum GuideError {
    #[error("Failed to load module {module}: {reason}")]
    Load { module: String, reason: String },

    #[error("Module {module} requires {dependency}, which is not loaded")]
    Dependency { module: String, dependency: String },

    #[error("Cyclic module dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Render blocked: {0}")]
    RenderBlocked(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Guide not found: {0}")]
    GuideNotFound(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("No guides matched \"{0}\"")]
    NoResults(String),

    #[error("Invalid guide payload: {0}")]
    Payload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl GuideError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Load { .. } => ErrorCode::ModuleLoadFailed,
            Self::Dependency { .. } => ErrorCode::ModuleDependencyUnmet,
            Self::CyclicDependency { .. } => ErrorCode::ModuleCyclicDependency,
            Self::ModuleNotFound(_) => ErrorCode::ModuleNotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::RenderBlocked(_) => ErrorCode::RenderBlocked,
            Self::Runtime(_) => ErrorCode::RuntimeError,
            Self::GuideNotFound(_) => ErrorCode::GuideNotFound,
            Self::InvalidQuery(_) => ErrorCode::SearchQueryInvalid,
            Self::NoResults(_) => ErrorCode::SearchNoResults,
            Self::Payload(_) => ErrorCode::PayloadInvalid,
            Self::Storage(_) => ErrorCode::StorageWriteError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Http(_) => ErrorCode::NetworkRequestFailed,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::Load { module, reason } => {
                Some(serde_json::json!({ "module": module, "reason": reason }))
            }
            Self::Dependency { module, dependency } => {
                Some(serde_json::json!({ "module": module, "dependency": dependency }))
            }
            Self::CyclicDependency { cycle } => Some(serde_json::json!({ "cycle": cycle })),
            Self::ModuleNotFound(name) => Some(serde_json::json!({ "module": name })),
            Self::GuideNotFound(id) => Some(serde_json::json!({ "guide_id": id })),
            Self::NoResults(query) => Some(serde_json::json!({ "query": query })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Whether this error aborts application startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Load { .. } | Self::Dependency { .. } | Self::CyclicDependency { .. }
        )
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_guide_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in robot mode so callers can branch on `code` instead of parsing
/// the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "GUIDE_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "module", "catalog", "storage")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`GuideError`].
    #[must_use]
    pub fn from_guide_error(err: &GuideError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }

    /// Set a custom suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<GuideError> for StructuredError {
    fn from(err: GuideError) -> Self {
        Self::from_guide_error(&err)
    }
}

impl From<&GuideError> for StructuredError {
    fn from(err: &GuideError) -> Self {
        Self::from_guide_error(err)
    }
}

/// Result type alias using GuideError.
pub type Result<T> = std::result::Result<T, GuideError>;
