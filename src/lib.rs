//! homeguide - House maintenance guide browser
//!
//! A catalog of home repair guides with a full-text search index, category
//! filters, a guide viewer, and the event-driven module stack that ties
//! them together.

pub mod app;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod events;
pub mod navigation;
pub mod search;
pub mod security;
pub mod storage;
pub mod viewer;

pub use error::{GuideError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
