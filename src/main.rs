//! homeguide - House maintenance guide browser
//!
//! Search, filter and open home repair guides from the terminal.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use homeguide::cli::output::robot_error;
use homeguide::cli::{commands, Cli, CliContext};
use homeguide::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // Robot mode: structured error on stdout
                let payload = serde_json::to_string(&robot_error(&e)).unwrap_or_default();
                println!("{payload}");
            } else {
                eprintln!("{} {e}", "Error:".red().bold());
                let suggestion = e.to_structured().suggestion;
                if !suggestion.is_empty() {
                    eprintln!("  {}", suggestion.dimmed());
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = CliContext::from_cli(cli)?;
    commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,homeguide=info",
        1 => "info,homeguide=debug",
        2 => "debug,homeguide=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
