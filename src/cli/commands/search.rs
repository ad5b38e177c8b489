//! homeguide search - Search guides
//!
//! Runs the same index the interactive search box uses, then applies the
//! category filters.

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::core::Guide;
use crate::error::{GuideError, Result};
use crate::search::{highlight_with_class, segments, FilterSet};
use crate::security::sanitize_text;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Category filters (comma-separated): all, kitchen, bathroom, emergency, seasonal, ...
    #[arg(long, short, default_value = "all", value_delimiter = ',')]
    pub filter: Vec<String>,

    /// Maximum number of results (defaults to search.max_results)
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Show relevance scores
    #[arg(long)]
    pub scores: bool,

    /// Do not record the query in search history
    #[arg(long)]
    pub no_history: bool,

    /// Exit with an error when nothing matches
    #[arg(long)]
    pub fail_empty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit<'a> {
    id: &'a str,
    title: &'a str,
    title_html: String,
    description: &'a str,
    category: &'a str,
    difficulty: &'a str,
    time_estimate: &'a str,
    score: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    query: &'a str,
    filters: Vec<&'a str>,
    total: usize,
    results: Vec<SearchHit<'a>>,
}

pub fn run(ctx: &CliContext, args: &SearchArgs) -> Result<()> {
    let app = ctx.start_app()?;
    let search = app.search()?;

    let query = args.query.trim();
    if query.chars().count() < search.min_query_len() {
        return Err(GuideError::InvalidQuery(format!(
            "'{query}' is shorter than {} characters",
            search.min_query_len()
        )));
    }

    let filters = FilterSet::from_tags(&args.filter);
    let limit = args.limit.unwrap_or(ctx.config.search.max_results);
    let scored = search.query_scored(query, &filters);
    let total = scored.len();
    if !args.no_history {
        search.remember(query);
    }
    if total == 0 && args.fail_empty {
        return Err(GuideError::NoResults(query.to_string()));
    }

    let class = &ctx.config.search.highlight_class;
    let results: Vec<_> = scored
        .iter()
        .take(limit)
        .map(|(guide, score)| SearchHit {
            id: &guide.id,
            title: &guide.title,
            title_html: highlight_with_class(&sanitize_text(&guide.title), query, class),
            description: &guide.description,
            category: guide.category.as_str(),
            difficulty: guide.difficulty.as_str(),
            time_estimate: &guide.time_estimate,
            score: *score,
        })
        .collect();

    if ctx.robot {
        return emit_json(&robot_ok(SearchOutput {
            query,
            filters: filters.iter().collect(),
            total,
            results,
        }));
    }

    if scored.is_empty() {
        println!("{} No guides found for \"{}\"", "!".yellow(), query);
        println!("  Try different keywords, or reset the filter with --filter all");
        return Ok(());
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("{total} guide(s) for \"{query}\""));
    for (guide, score) in scored.iter().take(limit) {
        layout.push_line(format_hit(guide, query, args.scores.then_some(*score)));
        layout.push_line(format!("    {}", guide.description.dimmed()));
    }
    if total > limit {
        layout.blank().push_line(format!("... and {} more", total - limit).dimmed().to_string());
    }
    emit_human(layout);
    Ok(())
}

fn format_hit(guide: &Guide, query: &str, score: Option<f64>) -> String {
    let title: String = segments(&guide.title, query)
        .into_iter()
        .map(|(part, matched)| {
            if matched {
                part.bold().yellow().to_string()
            } else {
                part.bold().to_string()
            }
        })
        .collect();
    let mut line = format!(
        "  {} {title} [{} | {} | {}]",
        guide.id.cyan(),
        guide.category.label(),
        guide.difficulty,
        guide.time_estimate
    );
    if let Some(score) = score {
        line.push_str(&format!(" {}", format!("score={score:.1}").dimmed()));
    }
    line
}
