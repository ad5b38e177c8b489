//! Search engine for guides
//!
//! An in-memory inverted index with partial-match scoring and category
//! filters, plus the module that binds it to the event bus.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │              SEARCH_QUERY_CHANGED / FILTER_SELECTED            │
//! └────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │   SearchSystem (system.rs)    │──► SearchHistory
//!                └───────────────────────────────┘
//!                     │                    │
//!                     ▼                    ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │       SearchIndex            │  │       Renderer               │
//! │  (exact + partial scoring)   │  │  (sanitized cards, <mark>)   │
//! └──────────────────────────────┘  └──────────────────────────────┘
//!                     │                    │
//!                     └──────────┬─────────┘
//!                                ▼
//!                      SEARCH_RESULTS_READY
//! ```

pub mod filters;
pub mod highlight;
pub mod history;
pub mod index;
pub mod render;
pub mod system;

pub use filters::{filter_counts, FilterCount, FilterSet, ALL};
pub use highlight::{highlight, highlight_with_class, match_ranges, segments};
pub use history::SearchHistory;
pub use index::{tokenize, ScoredGuide, SearchIndex};
pub use render::{room_icon, Renderer};
pub use system::{SearchStats, SearchSystem, SearchView};
