//! homeguide favorite - Manage favorite guides

use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct FavoriteArgs {
    #[command(subcommand)]
    pub command: FavoriteCommand,
}

#[derive(Subcommand, Debug)]
pub enum FavoriteCommand {
    /// Mark a guide as favorite
    Add {
        /// Guide identifier
        id: String,
    },
    /// Remove a guide from favorites
    Remove {
        /// Guide identifier
        id: String,
    },
    /// List favorite guides
    List,
}

#[derive(Serialize)]
struct FavoriteEntry<'a> {
    id: &'a str,
    title: Option<&'a str>,
}

pub fn run(ctx: &CliContext, args: &FavoriteArgs) -> Result<()> {
    match &args.command {
        FavoriteCommand::Add { id } => set(ctx, id, true),
        FavoriteCommand::Remove { id } => set(ctx, id, false),
        FavoriteCommand::List => list(ctx),
    }
}

fn set(ctx: &CliContext, id: &str, wanted: bool) -> Result<()> {
    let app = ctx.start_app()?;
    let viewer = app.viewer()?;
    let current = viewer.view(id)?.favorite;
    let changed = current != wanted;
    if changed {
        viewer.toggle_favorite_for(id)?;
    }

    if ctx.robot {
        return emit_json(&robot_ok(json!({
            "id": id,
            "favorite": wanted,
            "changed": changed,
        })));
    }
    match (wanted, changed) {
        (true, true) => println!("{} Added {} to favorites", "✓".green(), id.cyan()),
        (false, true) => println!("{} Removed {} from favorites", "✓".green(), id.cyan()),
        (true, false) => println!("{} {} is already a favorite", "!".yellow(), id.cyan()),
        (false, false) => println!("{} {} is not a favorite", "!".yellow(), id.cyan()),
    }
    Ok(())
}

fn list(ctx: &CliContext) -> Result<()> {
    let favorites = ctx.prefs.favorites();
    let entries: Vec<_> = favorites
        .iter()
        .map(|id| FavoriteEntry {
            id,
            title: ctx.catalog.get(id).map(|guide| guide.title.as_str()),
        })
        .collect();

    if ctx.robot {
        return emit_json(&robot_ok(entries));
    }
    if entries.is_empty() {
        println!("{}", "No favorite guides".dimmed());
        return Ok(());
    }
    let mut layout = HumanLayout::new();
    layout.title("Favorite guides");
    for entry in &entries {
        let title = entry.title.unwrap_or("(not in current catalog)");
        layout.push_line(format!("  {} {title}", entry.id.cyan()));
    }
    emit_human(layout);
    Ok(())
}
