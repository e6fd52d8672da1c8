// MIT License
// Copyright (c) 2024 Graham King

use std::path;

use crate::error::Result;
use crate::progress::Progress;

// Phrase uniqueness is checked before insert, not enforced here.
// `date DATE` gives the column NUMERIC affinity, same as databases already in use.
pub const CREATE_PHRASE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS search_phrases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phrase TEXT,
    date DATE
)
"#;

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchPhrase {
    pub id: i64,
    pub phrase: String,
    // dd-mm-yyyy
    pub date: String,
}

pub struct PhraseStore {
    conn: rusqlite::Connection,
}

impl PhraseStore {
    pub fn open(db_path: &path::Path) -> Result<PhraseStore> {
        PhraseStore::new(rusqlite::Connection::open(db_path)?)
    }

    pub fn new(conn: rusqlite::Connection) -> Result<PhraseStore> {
        conn.execute(CREATE_PHRASE_TABLE, ())?;
        Ok(PhraseStore { conn })
    }

    /// Insert every phrase not already stored, stamped with `date`.
    /// Each row commits on its own. Returns how many were new.
    pub fn insert(&self, phrases: &[String], date: &str) -> Result<usize> {
        let mut exists_stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM search_phrases WHERE phrase = ?1")?;
        let mut insert_stmt = self
            .conn
            .prepare("INSERT INTO search_phrases (phrase, date) VALUES (?1, ?2)")?;

        let mut progress = Progress::new("Adding phrases to the database", phrases.len());
        let mut inserted = 0;
        for phrase in phrases {
            let count: i64 = exists_stmt.query_row([phrase], |row| row.get(0))?;
            if count == 0 {
                insert_stmt.execute((phrase, date))?;
                inserted += 1;
            }
            progress.tick();
        }
        progress.finish();
        Ok(inserted)
    }

    /// Delete every phrase containing any of the words, matched case-sensitively.
    /// Returns rows deleted.
    pub fn remove(&self, negative_words: &[String]) -> Result<usize> {
        // instr rather than LIKE: LIKE folds ASCII case and treats '_' as a wildcard
        let mut stmt = self
            .conn
            .prepare("DELETE FROM search_phrases WHERE instr(phrase, ?1) > 0")?;

        let mut progress = Progress::new("Removing negative phrases", negative_words.len());
        let mut deleted = 0;
        for word in negative_words {
            let word = word.trim();
            if !word.is_empty() {
                deleted += stmt.execute([word])?;
            }
            progress.tick();
        }
        progress.finish();
        Ok(deleted)
    }

    /// Rows whose date falls between the bounds.
    /// Stored dd-mm-yyyy values stay TEXT, so a dd-mm-yyyy bound compares as a
    /// string, not a calendar day. A bound that looks like a number ("2024")
    /// takes the column's NUMERIC affinity and becomes an integer, and every
    /// TEXT date sorts above any integer.
    pub fn export_range(&self, start_date: &str, end_date: &str) -> Result<Vec<SearchPhrase>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phrase, date FROM search_phrases WHERE date BETWEEN ?1 AND ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map((start_date, end_date), |row| {
            Ok(SearchPhrase {
                id: row.get(0)?,
                phrase: row.get(1)?,
                date: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM search_phrases", (), |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        Ok(())
    }
}
