//! homeguide modules - Show module load order and health

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::MODULES;
use crate::bootstrap::{HealthReport, ModuleGraph, ModuleState};
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::error::Result;
use crate::events::BusStats;

#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Also list which modules depend on each one
    #[arg(long)]
    pub dependents: bool,
}

#[derive(Serialize)]
struct ModulesOutput {
    health: HealthReport,
    bus: BusStats,
}

pub fn run(ctx: &CliContext, args: &ModulesArgs) -> Result<()> {
    let app = ctx.start_app()?;
    let health = app.health();

    if ctx.robot {
        return emit_json(&robot_ok(ModulesOutput {
            health,
            bus: app.bus().stats(),
        }));
    }

    let graph = ModuleGraph::from_declared(
        MODULES
            .iter()
            .map(|spec| (spec.name, spec.depends_on.iter().copied())),
    );
    let mut layout = HumanLayout::new();
    layout.title("Modules");
    for (position, module) in health.modules.iter().enumerate() {
        let state = match module.state {
            ModuleState::Initialized => module.state.as_str().green(),
            ModuleState::Failed => module.state.as_str().red(),
            _ => module.state.as_str().yellow(),
        };
        layout.push_line(format!("  {}. {} [{state}]", position + 1, module.name.bold()));
        if !module.depends_on.is_empty() {
            layout.push_line(format!("     needs {}", module.depends_on.join(", ").dimmed()));
        }
        if args.dependents {
            let dependents = graph.transitive_dependents(&module.name);
            if !dependents.is_empty() {
                layout.push_line(format!("     used by {}", dependents.join(", ").dimmed()));
            }
        }
        if let Some(error) = &module.error {
            layout.push_line(format!("     {}", error.red()));
        }
    }
    layout.blank().kv(
        "Initialized",
        if health.initialized { "yes" } else { "no" },
    );
    emit_human(layout);
    app.shutdown();
    Ok(())
}
