//! homeguide errors - Inspect the runtime error log

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::cli::CliContext;
use crate::diagnostics::{ErrorReport, Severity};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ErrorsArgs {
    #[command(subcommand)]
    pub command: Option<ErrorsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ErrorsCommand {
    /// List recorded errors, newest first (default)
    List {
        /// Only show errors of this severity or higher
        #[arg(long)]
        min_severity: Option<Severity>,
    },
    /// Show counts by type and severity
    Stats,
    /// Forget every recorded error
    Clear,
    /// Record an error by hand
    Report {
        /// Error message
        message: String,
    },
}

pub fn run(ctx: &CliContext, args: &ErrorsArgs) -> Result<()> {
    let app = ctx.start_app()?;
    let reporter = app.reporter();

    match args.command.as_ref().unwrap_or(&ErrorsCommand::List { min_severity: None }) {
        ErrorsCommand::List { min_severity } => {
            let log: Vec<ErrorReport> = reporter
                .log()
                .into_iter()
                .filter(|report| min_severity.is_none_or(|min| report.severity >= min))
                .collect();
            if ctx.robot {
                return emit_json(&robot_ok(log));
            }
            if log.is_empty() {
                println!("{}", "No errors recorded".dimmed());
                return Ok(());
            }
            let mut layout = HumanLayout::new();
            layout.title(&format!("{} recorded error(s)", log.len()));
            for report in &log {
                let severity = match report.severity {
                    Severity::High => report.severity.as_str().red(),
                    Severity::Medium => report.severity.as_str().yellow(),
                    Severity::Low => report.severity.as_str().dimmed(),
                };
                layout.push_line(format!(
                    "  {} [{severity}] {}: {}",
                    report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    report.kind.bold(),
                    report.message
                ));
            }
            emit_human(layout);
        }
        ErrorsCommand::Stats => {
            let stats = reporter.stats();
            if ctx.robot {
                return emit_json(&robot_ok(stats));
            }
            let mut layout = HumanLayout::new();
            layout.title("Error statistics");
            layout.kv("Total", &stats.total.to_string());
            for (severity, count) in &stats.by_severity {
                layout.kv(severity.as_str(), &count.to_string());
            }
            if !stats.by_type.is_empty() {
                layout.blank().section("By type");
                for (kind, count) in &stats.by_type {
                    layout.kv(kind, &count.to_string());
                }
            }
            emit_human(layout);
        }
        ErrorsCommand::Clear => {
            reporter.clear();
            if ctx.robot {
                return emit_json(&robot_ok(json!({ "cleared": true })));
            }
            println!("{} Error log cleared", "✓".green());
        }
        ErrorsCommand::Report { message } => {
            let report = reporter.report_manual(message.clone(), json!({ "origin": "cli" }));
            if ctx.robot {
                return emit_json(&robot_ok(report));
            }
            match report {
                Some(report) => println!("{} Recorded {} ({})", "✓".green(), report.id.cyan(), report.severity.as_str()),
                None => println!("{} Error reporting is disabled", "!".yellow()),
            }
        }
    }
    Ok(())
}
