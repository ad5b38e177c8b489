//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod context;
pub mod output;

pub use context::CliContext;

/// homeguide - browse and search house maintenance guides
#[derive(Parser, Debug)]
#[command(name = "homeguide")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable machine-readable JSON output
    #[arg(long, short = 'm', visible_alias = "machine", global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/homeguide/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Guide payload URL or file (overrides catalog.source)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Data directory holding the preference database
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search guides
    Search(commands::search::SearchArgs),

    /// List category filters with guide counts
    Filters(commands::filters::FiltersArgs),

    /// Show one guide with steps, tools and tips
    Show(commands::show::ShowArgs),

    /// Show or clear search history
    History(commands::history::HistoryArgs),

    /// Manage favorite guides
    Favorite(commands::favorite::FavoriteArgs),

    /// Show module load order and health
    Modules(commands::modules::ModulesArgs),

    /// Sanitize markup against the render allow-list
    Sanitize(commands::sanitize::SanitizeArgs),

    /// Inspect the runtime error log
    Errors(commands::errors::ErrorsArgs),

    /// Drive the event dispatcher interactively from stdin
    Browse(commands::browse::BrowseArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["homeguide", "search", "drain", "-m", "-vv", "--source", "g.json"]).unwrap();
        assert!(cli.robot);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.source.as_deref(), Some("g.json"));
        assert!(matches!(cli.command, Commands::Search(_)));
    }
}
