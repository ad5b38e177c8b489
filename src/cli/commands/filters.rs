//! homeguide filters - List category filters with guide counts

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::core::CatalogSource;
use crate::error::Result;
use crate::search::{filter_counts, FilterCount};

#[derive(Args, Debug)]
pub struct FiltersArgs {
    /// Hide filters that match no guides
    #[arg(long)]
    pub non_empty: bool,
}

#[derive(Serialize)]
struct FiltersOutput<'a> {
    source: &'a CatalogSource,
    total_guides: usize,
    filters: Vec<FilterCount>,
}

pub fn run(ctx: &CliContext, args: &FiltersArgs) -> Result<()> {
    let mut counts = filter_counts(ctx.catalog.guides());
    if args.non_empty {
        counts.retain(|count| count.count > 0);
    }

    if ctx.robot {
        return emit_json(&robot_ok(FiltersOutput {
            source: ctx.catalog.source(),
            total_guides: ctx.catalog.len(),
            filters: counts,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Filters ({} guides)", ctx.catalog.len()));
    for count in &counts {
        let number = if count.count == 0 {
            count.count.to_string().dimmed()
        } else {
            count.count.to_string().green()
        };
        let filter = format!("{:<14}", count.filter);
        layout.push_line(format!("  {} {:<16} {number}", filter.cyan(), count.label));
    }
    emit_human(layout);
    Ok(())
}
