// MIT License
// Copyright (c) 2024 Graham King

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("CSV file has no '{0}' column")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Open a file for reading, mapping a missing file to [`Error::FileNotFound`].
pub fn open_input(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(err),
    })
}
