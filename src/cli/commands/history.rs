//! homeguide history - Show or clear search history

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::error::{GuideError, Result};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Forget every recorded query
    #[arg(long)]
    pub clear: bool,
}

pub fn run(ctx: &CliContext, args: &HistoryArgs) -> Result<()> {
    let app = ctx.start_app()?;
    let search = app.search()?;

    if args.clear {
        if !search.clear_history() {
            return Err(GuideError::Storage("could not clear search history".into()));
        }
        if ctx.robot {
            return emit_json(&robot_ok(json!({ "cleared": true })));
        }
        println!("{} Search history cleared", "✓".green());
        return Ok(());
    }

    let history = search.history();
    if ctx.robot {
        return emit_json(&robot_ok(json!({
            "capacity": ctx.config.search.history_capacity,
            "queries": history,
        })));
    }

    if history.is_empty() {
        println!("{}", "No searches recorded yet".dimmed());
        return Ok(());
    }
    let mut layout = HumanLayout::new();
    layout.title("Recent searches");
    for query in &history {
        layout.bullet(query);
    }
    emit_human(layout);
    Ok(())
}
