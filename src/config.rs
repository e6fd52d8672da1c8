// MIT License
// Copyright (c) 2024 Graham King

use std::fs;
use std::path;

use crate::error::Result;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Config {
    pub log: LogSection,
    pub database: DatabaseSection,

    // Directory the config was loaded from. Every relative path resolves here.
    #[serde(skip)]
    pub base_dir: path::PathBuf,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct LogSection {
    pub filename: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct DatabaseSection {
    pub filename: String,
}

impl Config {
    pub fn load(config_path: &path::Path) -> Result<Config> {
        let s = fs::read_to_string(config_path)?;
        let mut cfg: Config = serde_json::from_str(&s)?;
        cfg.base_dir = match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => path::PathBuf::from("."),
        };
        Ok(cfg)
    }

    pub fn db_path(&self) -> path::PathBuf {
        self.base_dir.join(&self.database.filename)
    }

    pub fn log_dir(&self) -> path::PathBuf {
        self.base_dir.join("logs")
    }

    pub fn log_path(&self) -> path::PathBuf {
        self.log_dir().join(&self.log.filename)
    }

    /// Where an export file with this name is written
    pub fn export_path(&self, filename: &str) -> path::PathBuf {
        self.base_dir.join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resolves_paths_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("config.json");
        fs::write(
            &cfg_path,
            r#"{"log": {"filename": "app.log"}, "database": {"filename": "phrases.db"}}"#,
        )
        .unwrap();

        let cfg = Config::load(&cfg_path).unwrap();
        assert_eq!(cfg.db_path(), dir.path().join("phrases.db"));
        assert_eq!(cfg.log_path(), dir.path().join("logs").join("app.log"));
        assert_eq!(
            cfg.export_path("exported_data.csv"),
            dir.path().join("exported_data.csv")
        );
    }

    #[test]
    fn missing_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("config.json");
        fs::write(&cfg_path, r#"{"log": {"filename": "app.log"}}"#).unwrap();

        let err = Config::load(&cfg_path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)), "{err}");
    }

    #[test]
    fn unloaded_config_has_no_base_dir() {
        let cfg: Config = serde_json::from_str(
            r#"{"log": {"filename": "a.log"}, "database": {"filename": "a.db"}}"#,
        )
        .unwrap();
        // serde(skip) leaves base_dir empty until load() fills it
        assert_eq!(cfg.db_path(), path::PathBuf::from("a.db"));
    }
}
