//! Per-invocation context: resolved config, preferences and catalog

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::app::App;
use crate::config::{resolve_root, Config};
use crate::core::Catalog;
use crate::error::Result;
use crate::storage::{Preferences, SqliteStore};

use super::Cli;

#[derive(Debug)]
pub struct CliContext {
    pub robot: bool,
    pub root: PathBuf,
    pub config: Config,
    pub prefs: Preferences,
    pub catalog: Catalog,
}

impl CliContext {
    /// Resolve everything a command needs. The catalog is loaded here, before
    /// any async runtime exists, because remote payloads use a blocking client.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = resolve_root(cli.root.as_deref());
        let mut config = Config::load(cli.config.as_deref(), &root)?;
        if let Some(source) = &cli.source {
            config.catalog.source.clone_from(source);
        }

        let db_path = config.database_path(&root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %db_path.display(), "opening preference store");
        let prefs = Preferences::new(Arc::new(SqliteStore::open(&db_path)?));
        let catalog = Catalog::load(&config.catalog, config.app.offline_mode);

        Ok(Self {
            robot: cli.robot,
            root,
            config,
            prefs,
            catalog,
        })
    }

    /// Build and start the full module stack.
    pub fn start_app(&self) -> Result<App> {
        let mut app = App::new(
            self.config.clone(),
            self.catalog.guides().to_vec(),
            self.prefs.clone(),
        );
        app.start()?;
        Ok(app)
    }
}
