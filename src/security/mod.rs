//! Output safety: allow-list sanitizer for everything rendered from guide data

pub mod sanitizer;

pub use sanitizer::{sanitize_text, Sanitizer, SanitizerStats, SAFE_URL_PLACEHOLDER};
