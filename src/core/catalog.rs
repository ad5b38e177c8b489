//! Guide catalog loading.
//!
//! The payload is a JSON object with a `guides` array, read once at startup
//! from an `http(s)://` URL or a file. Any failure falls back to the built-in
//! guide set so the browser always has something to show.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{GuideError, Result};

use super::guide::Guide;
use super::samples::fallback_guides;

const USER_AGENT: &str = concat!("homeguide/", env!("CARGO_PKG_VERSION"));

/// Where the loaded guides came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum CatalogSource {
    Remote(String),
    File(String),
    Fallback,
}

/// The immutable guide collection for one session.
#[derive(Debug, Clone)]
pub struct Catalog {
    guides: Vec<Guide>,
    source: CatalogSource,
}

impl Catalog {
    #[must_use]
    pub const fn new(guides: Vec<Guide>, source: CatalogSource) -> Self {
        Self { guides, source }
    }

    #[must_use]
    pub fn fallback() -> Self {
        Self::new(fallback_guides(), CatalogSource::Fallback)
    }

    /// Load the catalog described by `config`. Never fails: on any error the
    /// fallback set is returned and the cause is logged.
    #[must_use]
    pub fn load(config: &CatalogConfig, offline: bool) -> Self {
        if offline && is_remote(&config.source) {
            info!(source = %config.source, "offline mode, using built-in guides");
            return Self::fallback();
        }

        match Self::try_load(config) {
            Ok(catalog) => {
                info!(count = catalog.len(), source = %config.source, "loaded guides");
                catalog
            }
            Err(err) => {
                warn!(source = %config.source, error = %err, "could not load guides, using built-in set");
                Self::fallback()
            }
        }
    }

    /// Load the catalog, propagating the first failure.
    pub fn try_load(config: &CatalogConfig) -> Result<Self> {
        let source = config.source.trim();
        if is_remote(source) {
            let raw = fetch_remote(source, Duration::from_secs(config.timeout_secs.max(1)))?;
            let guides = parse_payload(&raw)?;
            Ok(Self::new(guides, CatalogSource::Remote(source.to_string())))
        } else {
            let raw = std::fs::read_to_string(Path::new(source))?;
            let guides = parse_payload(&raw)?;
            Ok(Self::new(guides, CatalogSource::File(source.to_string())))
        }
    }

    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    #[must_use]
    pub const fn source(&self) -> &CatalogSource {
        &self.source
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Guide> {
        self.guides.iter().find(|guide| guide.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn fetch_remote(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;

    debug!(url, "fetching guide payload");
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(GuideError::Payload(format!(
            "GET {url} returned HTTP {}",
            response.status()
        )));
    }
    Ok(response.text()?)
}

/// Parse a guide payload.
///
/// Entries that are not objects, lack a non-empty `id`, or fail to decode are
/// skipped with a warning. Later duplicates of an id are dropped.
pub fn parse_payload(raw: &str) -> Result<Vec<Guide>> {
    let value: Value = serde_json::from_str(raw)?;
    let entries = value
        .get("guides")
        .and_then(Value::as_array)
        .ok_or_else(|| GuideError::Payload("expected an object with a `guides` array".to_string()))?;

    let mut seen = HashSet::new();
    let mut guides = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            warn!(position, "skipping guide entry that is not an object");
            continue;
        }
        let guide: Guide = match serde_json::from_value(entry.clone()) {
            Ok(guide) => guide,
            Err(err) => {
                warn!(position, error = %err, "skipping malformed guide entry");
                continue;
            }
        };
        if guide.id.trim().is_empty() {
            warn!(position, "skipping guide entry with empty id");
            continue;
        }
        if !seen.insert(guide.id.clone()) {
            warn!(id = %guide.id, "dropping duplicate guide id");
            continue;
        }
        guides.push(guide);
    }
    Ok(guides)
}
