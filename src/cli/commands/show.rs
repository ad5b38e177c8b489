//! homeguide show - Show one guide with steps, tools and tips

use clap::Args;
use colored::Colorize;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::error::{GuideError, Result};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Guide identifier (e.g. kitchen-001)
    pub id: String,

    /// Mark a step (1-based) as opened
    #[arg(long)]
    pub step: Option<u32>,
}

pub fn run(ctx: &CliContext, args: &ShowArgs) -> Result<()> {
    let app = ctx.start_app()?;
    let viewer = app.viewer()?;
    viewer.open_guide(&args.id)?;

    if let Some(step) = args.step {
        if !viewer.track_step_open(step) {
            return Err(GuideError::Validation(format!(
                "step {step} is outside guide {}",
                args.id
            )));
        }
    }

    let view = viewer
        .current()
        .ok_or_else(|| GuideError::GuideNotFound(args.id.clone()))?;

    if ctx.robot {
        return emit_json(&robot_ok(&view));
    }

    let guide = &view.guide;
    let star = if view.favorite { " *".yellow().to_string() } else { String::new() };
    let mut layout = HumanLayout::new();
    layout.title(&format!("{}{star}", guide.title));
    layout
        .kv("Id", &guide.id)
        .kv("Room", guide.category.label())
        .kv("Difficulty", guide.difficulty.as_str())
        .kv("Time", &guide.time_estimate);
    if !guide.description.is_empty() {
        layout.blank().push_line(guide.description.clone());
    }

    if !guide.tools.is_empty() {
        layout.blank().section("Tools");
        for tool in &guide.tools {
            layout.bullet(tool);
        }
    }

    layout.blank().section("Steps");
    for (number, step) in (1u32..).zip(&view.steps) {
        let marker = if view.opened_steps.contains(&number) {
            "x".green().to_string()
        } else {
            " ".to_string()
        };
        layout.push_line(format!("[{marker}] {number}. {}", step.title.bold()));
        layout.push_line(format!("       {}", step.description));
    }

    layout.blank().section("Tips");
    for tip in &view.tips {
        layout.bullet(&format!("{}: {}", tip.title.bold(), tip.description));
    }
    emit_human(layout);
    Ok(())
}
