//! homeguide sanitize - Sanitize markup against the render allow-list

use std::io::Read;

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::cli::output::{emit_json, robot_ok};
use crate::cli::CliContext;
use crate::error::{GuideError, Result};
use crate::security::{sanitize_text, Sanitizer};

#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Markup to sanitize (reads stdin when omitted)
    pub input: Option<String>,

    /// Escape the input as plain text instead of filtering markup
    #[arg(long)]
    pub text: bool,

    /// Fail when the input contains a dangerous pattern
    #[arg(long)]
    pub check: bool,
}

pub fn run(ctx: &CliContext, args: &SanitizeArgs) -> Result<()> {
    let input = match &args.input {
        Some(input) => input.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let sanitizer = Sanitizer::new();
    let safe = sanitizer.is_safe(&input);
    if args.check && !safe {
        return Err(GuideError::RenderBlocked(
            "input contains script, inline handler or unsafe URL".into(),
        ));
    }

    let output = if args.text {
        sanitize_text(&input)
    } else {
        sanitizer.sanitize_html(&input)
    };

    if ctx.robot {
        return emit_json(&robot_ok(json!({
            "safe": safe,
            "output": output,
            "stats": sanitizer.stats(),
        })));
    }

    if !safe {
        eprintln!("{} Dangerous content was removed", "!".yellow());
    }
    println!("{output}");
    Ok(())
}
