//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::cli::{CliContext, Commands};
use crate::error::Result;

pub mod browse;
pub mod errors;
pub mod favorite;
pub mod filters;
pub mod history;
pub mod modules;
pub mod sanitize;
pub mod search;
pub mod show;

/// Dispatch a command to its handler
pub fn run(ctx: &CliContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::Filters(args) => filters::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::History(args) => history::run(ctx, args),
        Commands::Favorite(args) => favorite::run(ctx, args),
        Commands::Modules(args) => modules::run(ctx, args),
        Commands::Sanitize(args) => sanitize::run(ctx, args),
        Commands::Errors(args) => errors::run(ctx, args),
        Commands::Browse(args) => browse::run(ctx, args),
    }
}
