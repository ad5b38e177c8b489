//! homeguide browse - Drive the event dispatcher interactively
//!
//! Reads one command per line from stdin, turns it into a host event, and
//! prints every application event the bus carries in response. Typed search
//! input is debounced on a real runtime, so `type` commands settle after the
//! configured delay.
//!
//! ```text
//! type <text>              search box input
//! click room <key>         room card
//! click nav <page>         navigation item
//! click filter <filter>    filter chip
//! click theme              theme toggle
//! click issue <title>      common issue
//! click task <season>      seasonal task card
//! click guide <id>         "view guide" button
//! key [ctrl+|meta+|shift+|alt+]<key>
//! resize <width> <height>
//! hide | show              page visibility
//! back                     navigation history
//! state                    print application state
//! quit
//! ```

use std::time::Duration;

use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::App;
use crate::cli::output::emit_jsonl;
use crate::cli::CliContext;
use crate::dom::Element;
use crate::error::{GuideError, Result};
use crate::events::{AppEvent, HostEvent, KeyInput};

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Initial location, e.g. "/#room-kitchen" or "/?search"
    #[arg(long, default_value = "/")]
    pub location: String,
}

/// One parsed input line.
#[derive(Debug, Clone)]
pub enum BrowseCommand {
    Host(HostEvent),
    Back,
    State,
    Quit,
}

pub fn run(ctx: &CliContext, args: &BrowseArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let app = ctx.start_app()?;
        let robot = ctx.robot;
        let _printer = app.bus().on_any(move |event| print_event(event, robot));
        app.navigation()?.initialize_from_location(&args.location);

        let result = read_loop(&app, robot).await;
        settle(&app).await;
        app.shutdown();
        result
    })
}

async fn read_loop(app: &App, robot: bool) -> Result<()> {
    let dispatcher = app.dispatcher()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                if robot {
                    emit_jsonl(&serde_json::json!({ "error": err.to_string() }))?;
                } else {
                    eprintln!("{} {err}", "!".yellow());
                }
                continue;
            }
        };

        match command {
            BrowseCommand::Host(event) => {
                let outcome = dispatcher.dispatch(event);
                debug!(?outcome, "dispatched");
            }
            BrowseCommand::Back => {
                if !app.navigation()?.go_back() && !robot {
                    println!("{}", "Nothing to go back to".dimmed());
                }
            }
            BrowseCommand::State => {
                let state = app.state().snapshot();
                if robot {
                    emit_jsonl(&serde_json::json!({ "state": state }))?;
                } else {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                }
            }
            BrowseCommand::Quit => break,
        }
    }
    Ok(())
}

/// Wait until every debounced call has fired.
async fn settle(app: &App) {
    let Ok(dispatcher) = app.dispatcher() else {
        return;
    };
    while dispatcher.debouncer().pending_count() > 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn print_event(event: &AppEvent, robot: bool) {
    if robot {
        if let Err(err) = emit_jsonl(event) {
            debug!(error = %err, "could not serialize event");
        }
        return;
    }
    let payload = serde_json::to_value(event)
        .ok()
        .and_then(|value| value.get("payload").cloned())
        .map(|payload| payload.to_string())
        .unwrap_or_default();
    println!("{} {} {}", "->".cyan(), event.name().bold(), payload.dimmed());
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<BrowseCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let command = match verb {
        "type" => BrowseCommand::Host(HostEvent::Input {
            path: vec![Element::new("input").with_id("searchInput")],
            value: rest.to_string(),
        }),
        "click" => BrowseCommand::Host(HostEvent::Click {
            path: click_path(rest)?,
        }),
        "key" => BrowseCommand::Host(HostEvent::KeyDown {
            path: vec![Element::new("body")],
            key: parse_key(rest)?,
        }),
        "resize" => {
            let mut dims = rest.split_whitespace().map(str::parse::<u32>);
            match (dims.next(), dims.next()) {
                (Some(Ok(width)), Some(Ok(height))) => {
                    BrowseCommand::Host(HostEvent::Resize { width, height })
                }
                _ => return Err(usage("resize <width> <height>")),
            }
        }
        "hide" => BrowseCommand::Host(HostEvent::VisibilityChange { hidden: true }),
        "show" => BrowseCommand::Host(HostEvent::VisibilityChange { hidden: false }),
        "back" => BrowseCommand::Back,
        "state" => BrowseCommand::State,
        "quit" | "exit" => BrowseCommand::Quit,
        other => return Err(GuideError::Validation(format!("unknown command '{other}'"))),
    };
    Ok(Some(command))
}

fn click_path(rest: &str) -> Result<Vec<Element>> {
    let (target, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(target, arg)| (target, arg.trim()));
    let require = |what: &str| required(target, arg, what);

    let element = match target {
        "room" => Element::new("div")
            .with_class("room-card")
            .with_data("room", require("room")?),
        "nav" => Element::new("a")
            .with_class("nav-item")
            .with_data("page", require("page")?),
        "filter" => Element::new("button")
            .with_class("chip")
            .with_data("filter", require("filter")?),
        "theme" => Element::new("button").with_id("themeToggle"),
        "issue" => Element::new("div")
            .with_class("issue-item")
            .with_data("issue", require("title")?),
        "task" => Element::new("div")
            .with_class("task-card")
            .with_class(require("season")?),
        "guide" => Element::new("button")
            .with_class("view-guide-btn")
            .with_data("guide-id", require("id")?),
        other => {
            return Err(GuideError::Validation(format!(
                "unknown click target '{other}'"
            )))
        }
    };
    Ok(vec![element, Element::new("main")])
}

fn required<'a>(target: &str, arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(usage(&format!("click {target} <{what}>")))
    } else {
        Ok(arg)
    }
}

fn parse_key(spec: &str) -> Result<KeyInput> {
    if spec.is_empty() {
        return Err(usage("key [ctrl+|meta+|shift+|alt+]<key>"));
    }
    let mut parts: Vec<&str> = spec.split('+').collect();
    let key = parts.pop().unwrap_or_default();
    if key.is_empty() {
        return Err(usage("key [ctrl+|meta+|shift+|alt+]<key>"));
    }
    let mut input = KeyInput::plain(key);
    for modifier in parts {
        match modifier.to_lowercase().as_str() {
            "ctrl" | "control" => input.ctrl = true,
            "meta" | "cmd" => input.meta = true,
            "shift" => input.shift = true,
            "alt" => input.alt = true,
            other => return Err(GuideError::Validation(format!("unknown modifier '{other}'"))),
        }
    }
    Ok(input)
}

fn usage(form: &str) -> GuideError {
    GuideError::Validation(format!("usage: {form}"))
}
