//! # lucy
//!
//! Command-line front end for the drift engine: loads settings, opens the
//! response log and embedder, and runs one command.

#![deny(unsafe_code)]

mod cli;
mod commands;
mod embedder;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands::{App, read_input, settings_file};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let path = settings_file(args.settings.as_ref());
    let mut settings = lucy_settings::load_settings_from_path(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    args.apply_overrides(&mut settings);
    lucy_logging::init_subscriber(&settings.logging);

    let app = App::open(&settings).await?;

    match &args.command {
        Command::Evaluate(eval) => {
            let text = read_input(eval, std::io::stdin().lock())?;
            let report = app.evaluate(&text, eval).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Recent { limit } => {
            let records = app.recent(*limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Stats => {
            let stats = app.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
