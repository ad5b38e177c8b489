//! Core guide types and catalog loading

pub mod catalog;
pub mod guide;
pub mod samples;

pub use catalog::{parse_payload, Catalog, CatalogSource};
pub use guide::{Category, Difficulty, Guide};
pub use samples::fallback_guides;
