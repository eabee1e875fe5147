// cleanvars/src/main.rs
//! Command-line front end for the cleanvars scrubbing pipeline.
//!
//! Reads one block of text from a file or standard input, runs the full
//! scrub over it and writes the result to a file or standard output.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cleanvars_core::{scrub_with_template, ValueTemplate};

#[derive(Parser)]
#[command(name = "cleanvars", author, version, about)]
struct Cli {
    /// File to scrub; standard input when omitted
    input: Option<PathBuf>,

    /// Write the scrubbed text here instead of standard output
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Replacement for secret values; `${name}` receives the variable
    /// name derived from the key
    #[arg(long, default_value = "{{ ${name} }}", env = "CLEANVARS_TEMPLATE")]
    template: String,

    /// Suppress internal logging
    #[arg(long, short = 'q', conflicts_with = "debug")]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,
}

fn init_logger(quiet: bool, debug: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    // RUST_LOG still wins over the flag-derived default.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logger(args.quiet, args.debug);

    let input = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read standard input")?;
            buffer
        }
    };

    log::debug!("scrubbing {} bytes", input.len());
    let template = ValueTemplate::new(args.template.as_str());
    let scrubbed = scrub_with_template(&input, &template);

    match &args.output {
        Some(path) => fs::write(path, scrubbed.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout()
            .write_all(scrubbed.as_bytes())
            .context("failed to write to standard output")?,
    }
    Ok(())
}
