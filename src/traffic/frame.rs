// MIT License
// Copyright (c) 2024 Graham King

use std::io;
use std::path;

use crate::error::{open_input, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficRow {
    pub url: String,
    pub google: Option<String>,
    pub yandex: Option<String>,
    pub seans_all: Option<String>,
}

/// The rows of one source export, keyed by the URL column
#[derive(Debug, Default)]
pub struct TrafficFrame {
    pub rows: Vec<TrafficRow>,
}

impl TrafficFrame {
    pub fn from_path(path: &path::Path) -> Result<TrafficFrame> {
        TrafficFrame::from_reader(open_input(path)?)
    }

    /// Parse a headered CSV. URL is required, the value columns are optional
    /// and an empty cell reads as NULL. Rows without a URL are dropped.
    pub fn from_reader<R: io::Read>(r: R) -> Result<TrafficFrame> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(r);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let url_col = column("URL").ok_or(Error::MissingColumn("URL"))?;
        let google_col = column("Google");
        let yandex_col = column("Yandex");
        let seans_col = column("SeansAll");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .filter(|v| !v.trim().is_empty())
                    .map(String::from)
            };
            let Some(url) = cell(Some(url_col)) else {
                continue;
            };
            rows.push(TrafficRow {
                url,
                google: cell(google_col),
                yandex: cell(yandex_col),
                seans_all: cell(seans_col),
            });
        }
        Ok(TrafficFrame { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_known_columns_in_any_order() {
        let f = TrafficFrame::from_reader(
            "Extra,SeansAll,URL,Google\nz,3,http://a,1\nz,,http://b,\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(
            f.rows,
            vec![
                TrafficRow {
                    url: "http://a".to_string(),
                    google: Some("1".to_string()),
                    yandex: None,
                    seans_all: Some("3".to_string()),
                },
                TrafficRow {
                    url: "http://b".to_string(),
                    google: None,
                    yandex: None,
                    seans_all: None,
                },
            ]
        );
    }

    #[test]
    fn url_column_is_required() {
        let err = TrafficFrame::from_reader("Google,Yandex\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn("URL")));
    }

    #[test]
    fn blank_urls_are_skipped() {
        let f = TrafficFrame::from_reader("URL,Google\n,5\nhttp://c,6\n".as_bytes()).unwrap();
        assert_eq!(f.rows.len(), 1);
        assert_eq!(f.rows[0].url, "http://c");
    }
}
