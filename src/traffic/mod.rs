// MIT License
// Copyright (c) 2024 Graham King

use std::io;
use std::path;

use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::menu::Console;

mod db;
mod frame;

pub use db::{TrafficDb, UpsertReport};
pub use frame::TrafficFrame;

const EXPORT_FILE: &str = "exported_data.csv";

const MENU: &str = "Choose operation:
1. Update database
2. Export data to CSV
3. Exit
";

/// A traffic source. Each one has its own table named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Zakupka,
    Satom,
    TomasBy,
    TomasKz,
}

impl Source {
    /// Menu and export column order
    pub const ALL: [Source; 4] = [
        Source::Zakupka,
        Source::Satom,
        Source::TomasBy,
        Source::TomasKz,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Source::Zakupka => "zakupka",
            Source::Satom => "satom",
            Source::TomasBy => "tomasBy",
            Source::TomasKz => "tomasKz",
        }
    }

    /// "1" to "4", as numbered in the update menu
    pub fn from_choice(choice: &str) -> Option<Source> {
        let n: usize = choice.trim().parse().ok()?;
        Source::ALL.get(n.checked_sub(1)?).copied()
    }
}

pub fn run(cfg: &Config) -> Result<()> {
    let db = TrafficDb::open(&cfg.db_path())?;
    db.ensure_indexes_table()?;
    session(cfg, db, &mut Console::stdio())
}

/// Run the menu, then close the database whether or not the menu failed.
/// The menu's error wins over a close error.
pub fn session<R: io::BufRead, W: io::Write>(
    cfg: &Config,
    mut db: TrafficDb,
    console: &mut Console<R, W>,
) -> Result<()> {
    let result = menu_loop(cfg, &mut db, console);
    let closed = db.close();
    result.and(closed)
}

pub fn menu_loop<R: io::BufRead, W: io::Write>(
    cfg: &Config,
    db: &mut TrafficDb,
    console: &mut Console<R, W>,
) -> Result<()> {
    loop {
        // The menu text is the prompt
        let Some(choice) = console.choice(MENU)? else {
            break;
        };
        match choice.as_str() {
            "1" => match update(db, console) {
                Ok(Some((source, report))) => {
                    console.say(&format!(
                        "Database updated successfully: {} new, {} updated in {}.",
                        report.added,
                        report.updated,
                        source.table()
                    ))?;
                    info!("Updated {}: {report:?}", source.table());
                }
                Ok(None) => console.say("Update cancelled.")?,
                Err(err) => {
                    console.say(&format!("Update failed: {err}"))?;
                    error!("Error updating database: {err}");
                }
            },
            "2" => {
                let export_path = cfg.export_path(EXPORT_FILE);
                match db.export_joined(&export_path) {
                    Ok(count) => console.say(&format!(
                        "Data exported to CSV successfully: {count} URLs in {}",
                        export_path.display()
                    ))?,
                    Err(err) => {
                        console.say(&format!("Export failed: {err}"))?;
                        error!("Error exporting data to CSV: {err}");
                    }
                }
            }
            "3" => break,
            _ => console.say("Invalid choice. Please select again.")?,
        }
    }
    Ok(())
}

// Ask for a source and its CSV file, then upsert. None if the operator backs out.
fn update<R: io::BufRead, W: io::Write>(
    db: &mut TrafficDb,
    console: &mut Console<R, W>,
) -> Result<Option<(Source, UpsertReport)>> {
    for (idx, source) in Source::ALL.iter().enumerate() {
        console.say(&format!("{}. {}.csv", idx + 1, source.table()))?;
    }

    let (source, csv_path) = loop {
        let Some(choice) =
            console.prompt("Enter the number of the file you want to update (1-4): ")?
        else {
            return Ok(None);
        };
        let Some(source) = Source::from_choice(&choice) else {
            console.say("Invalid choice. Please enter a valid number.")?;
            continue;
        };
        let file_path = console
            .prompt(&format!("Enter the path to '{}.csv': ", source.table()))?
            .unwrap_or_default();
        if file_path.is_empty() {
            return Ok(None);
        }
        let csv_path = path::PathBuf::from(file_path);
        if csv_path.exists() {
            break (source, csv_path);
        }
        console.say(&format!("CSV file '{}' not found.", csv_path.display()))?;
    };

    let frame = TrafficFrame::from_path(&csv_path)?;
    let report = db.upsert(source, &frame)?;
    Ok(Some((source, report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseSection, LogSection};
    use std::fs;

    fn test_config(dir: &path::Path) -> Config {
        Config {
            log: LogSection {
                filename: "log.txt".to_string(),
            },
            database: DatabaseSection {
                filename: "portals_traffic.db".to_string(),
            },
            base_dir: dir.to_path_buf(),
        }
    }

    fn drive(cfg: &Config, db: &mut TrafficDb, input: &str) -> String {
        let mut console = Console::new(input.as_bytes(), Vec::new());
        menu_loop(cfg, db, &mut console).unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn source_choice_is_one_based() {
        assert_eq!(Source::from_choice("1"), Some(Source::Zakupka));
        assert_eq!(Source::from_choice(" 4 "), Some(Source::TomasKz));
        assert_eq!(Source::from_choice("0"), None);
        assert_eq!(Source::from_choice("5"), None);
        assert_eq!(Source::from_choice("two"), None);
    }

    #[test]
    fn update_twice_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut db = TrafficDb::open(&cfg.db_path()).unwrap();

        let input_csv = dir.path().join("satom.csv");
        fs::write(&input_csv, "URL,Google,Yandex,SeansAll\nhttp://a,10,20,30\n").unwrap();

        let missing = dir.path().join("nope.csv");
        let script = format!(
            "1\n9\n2\n{missing}\n2\n{csv}\n1\n2\n{csv}\n2\n3\n",
            missing = missing.display(),
            csv = input_csv.display()
        );
        let out = drive(&cfg, &mut db, &script);
        assert!(out.contains("Invalid choice. Please enter a valid number."));
        assert!(out.contains(&format!("CSV file '{}' not found.", missing.display())));
        assert!(out.contains("1 new, 0 updated in satom"), "{out}");
        assert!(out.contains("0 new, 1 updated in satom"), "{out}");
        assert!(out.contains("Data exported to CSV successfully: 1 URLs"));

        let exported = fs::read_to_string(cfg.export_path(EXPORT_FILE)).unwrap();
        assert_eq!(
            exported.lines().nth(1),
            Some("http://a,0,0,0,10,20,30,0,0,0,0,0,0")
        );
    }

    #[test]
    fn bad_csv_is_reported_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut db = TrafficDb::new(rusqlite::Connection::open_in_memory().unwrap());

        let no_url = dir.path().join("zakupka.csv");
        fs::write(&no_url, "Link,Google\nhttp://a,1\n").unwrap();

        let script = format!("1\n1\n{}\nfoo\n3\n", no_url.display());
        let out = drive(&cfg, &mut db, &script);
        assert!(out.contains("Update failed: CSV file has no 'URL' column"), "{out}");
        assert!(out.contains("Invalid choice. Please select again."));
    }

    #[test]
    fn empty_path_cancels_update() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut db = TrafficDb::new(rusqlite::Connection::open_in_memory().unwrap());
        let out = drive(&cfg, &mut db, "1\n3\n\n3\n");
        assert!(out.contains("Update cancelled."));
    }

    #[test]
    fn end_of_input_exits() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut db = TrafficDb::new(rusqlite::Connection::open_in_memory().unwrap());
        let out = drive(&cfg, &mut db, "1\n");
        // EOF inside the source prompt backs out, then EOF at the menu exits
        assert!(out.contains("Update cancelled."));
    }

    #[test]
    fn menu_text_is_the_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut db = TrafficDb::new(rusqlite::Connection::open_in_memory().unwrap());
        let out = drive(&cfg, &mut db, "x\n3\n");
        assert_eq!(
            out,
            "Choose operation:\n1. Update database\n2. Export data to CSV\n3. Exit\n\
             Invalid choice. Please select again.\n\
             Choose operation:\n1. Update database\n2. Export data to CSV\n3. Exit\n"
        );
    }

    struct ClosedOutput;

    impl io::Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn session_closes_db_when_menu_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());

        // Exclusive locking keeps the file locked until this connection closes
        let conn = rusqlite::Connection::open(cfg.db_path()).unwrap();
        conn.query_row("PRAGMA locking_mode = EXCLUSIVE", (), |_| Ok(()))
            .unwrap();
        let db = TrafficDb::new(conn);
        assert!(db.ensure_indexes_table().unwrap());

        let mut console = Console::new("3\n".as_bytes(), ClosedOutput);
        let err = session(&cfg, db, &mut console).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)), "{err}");

        let other = rusqlite::Connection::open(cfg.db_path()).unwrap();
        other
            .execute("INSERT INTO indexes (url) VALUES ('http://a')", ())
            .unwrap();
    }
}
