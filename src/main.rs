// MIT License
// Copyright (c) 2024 Graham King

use clap::{Parser, Subcommand};
use std::io;
use std::path;

mod clean;
mod config;
mod error;
mod logging;
mod menu;
mod phrases;
mod progress;
mod traffic;

use config::Config;

const DEFAULT_CONFIG: &str = "config.json";

#[derive(Parser)]
struct Cli {
    /// JSON config naming the log and database files.
    /// Those files, logs/ and exports live next to it.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG)]
    config: path::PathBuf,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import, filter and export search phrases
    Phrases,
    /// Update per-source traffic tables and export them joined by URL
    Traffic,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    report(run(&cli), &mut io::stdout())?;
    Ok(())
}

// Failures are printed, never turned into an exit code
fn report(result: anyhow::Result<()>, out: &mut impl io::Write) -> io::Result<()> {
    if let Err(err) = result {
        writeln!(out, "An error occurred: {err:#}")?;
    }
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = Config::load(&cli.config)?;
    logging::init(&cfg)?;
    match cli.command {
        Commands::Phrases => phrases::run(&cfg)?,
        Commands::Traffic => traffic::run(&cfg)?,
    }
    Ok(())
}
