// MIT License
// Copyright (c) 2024 Graham King

use std::io;
use std::path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{open_input, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NOT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Collapse whitespace, then strip everything that isn't a word character or whitespace.
pub fn clean_text(s: &str) -> String {
    let collapsed = WHITESPACE.replace_all(s, " ");
    let stripped = NOT_WORD.replace_all(collapsed.trim(), "");
    // A dropped trailing "!" leaves its separating space behind
    stripped.trim().to_string()
}

/// Every non-empty cleaned cell of a comma-delimited, headerless CSV file.
pub fn parse_phrases_file(path: &path::Path) -> Result<Vec<String>> {
    read_phrases(open_input(path)?)
}

/// Negative words from a semicolon-delimited, headerless CSV file.
pub fn parse_negative_words_file(path: &path::Path) -> Result<Vec<String>> {
    read_negative_words(open_input(path)?)
}

pub fn read_phrases<R: io::Read>(r: R) -> Result<Vec<String>> {
    read_cells(r, b',')
}

pub fn read_negative_words<R: io::Read>(r: R) -> Result<Vec<String>> {
    read_cells(r, b';')
}

fn read_cells<R: io::Read>(r: R, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(r);

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;
        for cell in record.iter() {
            let cleaned = clean_text(cell);
            if !cleaned.is_empty() {
                out.push(cleaned);
            }
        }
    }
    Ok(out)
}
