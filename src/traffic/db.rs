// MIT License
// Copyright (c) 2024 Graham King

use std::collections::HashMap;
use std::collections::HashSet;
use std::path;

use rusqlite::OptionalExtension;
use tracing::info;

use super::frame::TrafficFrame;
use super::Source;
use crate::error::Result;
use crate::progress::Progress;

// Created once, never written to
pub const CREATE_INDEXES_TABLE: &str = "CREATE TABLE IF NOT EXISTS indexes (url TEXT PRIMARY KEY)";

fn create_data_table(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table} (
    url TEXT PRIMARY KEY,
    Google TEXT,
    Yandex TEXT,
    SeansAll TEXT
)"#
    )
}

/// Google, Yandex, SeansAll as stored. Any of them may be NULL.
pub type Values = [Option<String>; 3];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub added: usize,
    pub updated: usize,
}

pub struct TrafficDb {
    conn: rusqlite::Connection,
}

impl TrafficDb {
    pub fn open(db_path: &path::Path) -> Result<TrafficDb> {
        let db = TrafficDb::new(rusqlite::Connection::open(db_path)?);
        info!("Database opened: {}", db_path.display());
        Ok(db)
    }

    pub fn new(conn: rusqlite::Connection) -> TrafficDb {
        TrafficDb { conn }
    }

    /// Create the indexes table if sqlite_master doesn't list it. True if it was created.
    pub fn ensure_indexes_table(&self) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'indexes'",
                (),
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        if found.is_some() {
            return Ok(false);
        }
        self.conn.execute(CREATE_INDEXES_TABLE, ())?;
        info!("Indexes table created");
        Ok(true)
    }

    /// Create the source's table if needed and return the URLs it already holds
    pub fn ensure_table(&self, source: Source) -> Result<HashSet<String>> {
        let table = source.table();
        self.conn.execute(&create_data_table(table), ())?;
        info!("Data table {table} created");

        let mut stmt = self.conn.prepare(&format!("SELECT url FROM {table}"))?;
        let urls = stmt
            .query_map((), |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(urls)
    }

    /// Two passes over the frame:
    /// 1. insert the URLs the table didn't have, URL only
    /// 2. update the value columns of the URLs it already had
    ///
    /// URLs added in pass 1 keep NULL values until a later run sees them as existing.
    pub fn upsert(&mut self, source: Source, frame: &TrafficFrame) -> Result<UpsertReport> {
        let table = source.table();
        let existing = self.ensure_table(source)?;

        let mut progress = Progress::new(&format!("Processing {table}"), frame.rows.len());
        let mut queued = HashSet::new();
        let mut urls_to_add = Vec::new();
        for row in &frame.rows {
            if !existing.contains(&row.url) && queued.insert(row.url.as_str()) {
                urls_to_add.push(row.url.as_str());
            }
            progress.tick();
        }
        progress.finish();

        if !urls_to_add.is_empty() {
            let tx = self.conn.transaction()?;
            let mut stmt = tx.prepare(&format!("INSERT INTO {table} (url) VALUES (?1)"))?;
            for url in &urls_to_add {
                stmt.execute([url])?;
            }
            stmt.finalize()?;
            tx.commit()?;
            info!("Added {} new URLs to {table} table", urls_to_add.len());
        }

        let mut progress = Progress::new(&format!("Updating {table}"), frame.rows.len());
        let mut updated = 0;
        let tx = self.conn.transaction()?;
        let mut stmt = tx.prepare(&format!(
            "UPDATE {table} SET Google = ?1, Yandex = ?2, SeansAll = ?3 WHERE url = ?4"
        ))?;
        for row in &frame.rows {
            if existing.contains(&row.url) {
                stmt.execute((&row.google, &row.yandex, &row.seans_all, &row.url))?;
                updated += 1;
            }
            progress.tick();
        }
        stmt.finalize()?;
        tx.commit()?;
        progress.finish();

        Ok(UpsertReport {
            added: urls_to_add.len(),
            updated,
        })
    }

    /// One wide row per URL across all sources, written to `export_path`.
    /// A source without the URL contributes "0" for each column.
    /// Returns the number of URLs written.
    pub fn export_joined(&self, export_path: &path::Path) -> Result<usize> {
        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, [Option<Values>; 4]> = HashMap::new();

        for (idx, source) in Source::ALL.iter().enumerate() {
            let table = source.table();
            self.conn.execute(&create_data_table(table), ())?;
            let mut stmt = self.conn.prepare(&format!(
                "SELECT url, Google, Yandex, SeansAll FROM {table} ORDER BY rowid"
            ))?;
            let rows = stmt.query_map((), |row| {
                let url: String = row.get(0)?;
                let values: Values = [row.get(1)?, row.get(2)?, row.get(3)?];
                Ok((url, values))
            })?;
            for row in rows {
                let (url, values) = row?;
                let entry = merged.entry(url.clone()).or_insert_with(|| {
                    order.push(url);
                    Default::default()
                });
                entry[idx] = Some(values);
            }
        }

        let mut writer = csv::Writer::from_path(export_path)?;
        writer.write_record(export_header())?;
        for url in &order {
            let mut record = vec![url.clone()];
            for by_source in &merged[url] {
                match by_source {
                    Some(values) => {
                        record.extend(values.iter().map(|v| v.clone().unwrap_or_default()))
                    }
                    None => record.extend(["0", "0", "0"].map(String::from)),
                }
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        info!("Exported data to CSV: {} URLs", order.len());
        Ok(order.len())
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        Ok(())
    }
}

fn export_header() -> Vec<String> {
    let mut header = vec!["URL".to_string()];
    for source in Source::ALL {
        let table = source.table();
        header.extend(["Google", "Yandex", "SeansAll"].map(|col| format!("{table}_{col}")));
    }
    header
}
