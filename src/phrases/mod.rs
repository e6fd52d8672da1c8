// MIT License
// Copyright (c) 2024 Graham King

use std::io;
use std::path;

use tracing::{error, info};

use crate::clean;
use crate::config::Config;
use crate::error::Result;
use crate::menu::Console;

mod db;

pub use db::PhraseStore;

const MENU: &str = "Select operation:
a. Export existing database file for a period to CSV
b. Add new search phrases
c. Exit";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub read: usize,
    pub inserted: usize,
    pub negative_words: usize,
    pub removed: usize,
    pub stored: usize,
}

pub fn run(cfg: &Config) -> Result<()> {
    let store = PhraseStore::open(&cfg.db_path())?;
    info!("Opened phrase database {}", cfg.db_path().display());
    session(cfg, store, &mut Console::stdio())
}

/// Run the menu, then close the store whether or not the menu failed.
/// The menu's error wins over a close error.
pub fn session<R: io::BufRead, W: io::Write>(
    cfg: &Config,
    store: PhraseStore,
    console: &mut Console<R, W>,
) -> Result<()> {
    let result = menu_loop(cfg, &store, console);
    let closed = store.close();
    result.and(closed)
}

pub fn menu_loop<R: io::BufRead, W: io::Write>(
    cfg: &Config,
    store: &PhraseStore,
    console: &mut Console<R, W>,
) -> Result<()> {
    loop {
        console.say(MENU)?;
        let Some(choice) = console.choice("Enter the operation letter (a/b/c): ")? else {
            break;
        };
        match choice.as_str() {
            "a" => {
                let Some(start) = console.prompt("Enter the start date in dd-mm-yyyy format: ")?
                else {
                    console.say("Export cancelled.")?;
                    continue;
                };
                let Some(end) = console.prompt("Enter the end date in dd-mm-yyyy format: ")?
                else {
                    console.say("Export cancelled.")?;
                    continue;
                };
                match export(cfg, store, &start, &end) {
                    Ok(Some((path, count))) => {
                        console.say(&format!("Data exported to file: {}", path.display()))?;
                        info!("Data export for the period {start} - {end} successful ({count} rows).");
                    }
                    Ok(None) => {
                        console.say("No data to export for the specified period.")?;
                        info!("Data export for the period {start} - {end} successful (no rows).");
                    }
                    Err(err) => {
                        console.say(&format!("Export failed: {err}"))?;
                        error!("Error exporting data for the period {start} - {end}: {err}");
                    }
                }
            }
            "b" => match import(store, console) {
                Ok(Some(report)) => {
                    console.say(&format!(
                        "Added {} of {} phrases, removed {} using {} negative words. {} phrases stored.",
                        report.inserted,
                        report.read,
                        report.removed,
                        report.negative_words,
                        report.stored,
                    ))?;
                    info!(
                        "Processing new phrases and removing negative phrases completed: {report:?}"
                    );
                }
                Ok(None) => console.say("Import cancelled.")?,
                Err(err) => {
                    console.say(&format!("Import failed: {err}"))?;
                    error!("Error processing new phrases and removing negative phrases: {err}");
                }
            },
            "c" => break,
            _ => console.say("Invalid operation choice. Please select a/b/c.")?,
        }
    }
    console.say("Program terminated.")?;
    Ok(())
}

/// Write the rows dated between start and end to export_<start>_<end>.csv.
/// None if there was nothing to write.
fn export(
    cfg: &Config,
    store: &PhraseStore,
    start: &str,
    end: &str,
) -> Result<Option<(path::PathBuf, usize)>> {
    let rows = store.export_range(start, end)?;
    if rows.is_empty() {
        return Ok(None);
    }
    let path = cfg.export_path(&format!("export_{start}_{end}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(Some((path, rows.len())))
}

// Insert the phrases file, then apply the negative words file.
// None if input ends at either path prompt.
fn import<R: io::BufRead, W: io::Write>(
    store: &PhraseStore,
    console: &mut Console<R, W>,
) -> Result<Option<ImportReport>> {
    let Some(phrases_path) =
        console.prompt("Enter the path to the CSV file with search phrases: ")?
    else {
        return Ok(None);
    };
    let phrases = clean::parse_phrases_file(path::Path::new(&phrases_path))?;
    let inserted = store.insert(&phrases, &today())?;

    let Some(words_path) =
        console.prompt("Enter the path to the CSV file with negative words: ")?
    else {
        return Ok(None);
    };
    let words = clean::parse_negative_words_file(path::Path::new(&words_path))?;
    let removed = store.remove(&words)?;

    Ok(Some(ImportReport {
        read: phrases.len(),
        inserted,
        negative_words: words.len(),
        removed,
        stored: store.count()?,
    }))
}

/// Today as dd-mm-yyyy, the format phrases are stamped with
pub fn today() -> String {
    chrono::Local::now().format("%d-%m-%Y").to_string()
}
