// MIT License
// Copyright (c) 2024 Graham King

use std::fs;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Send all tracing output to the append-only log file named in the config.
pub fn init(cfg: &Config) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(file_subscriber(cfg)?)?;
    Ok(())
}

// One timestamped line per event, no colour codes
fn file_subscriber(cfg: &Config) -> anyhow::Result<impl tracing::Subscriber + Send + Sync> {
    fs::create_dir_all(cfg.log_dir())?;
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(cfg.log_path())?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .finish())
}
