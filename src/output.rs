//! Output formatting and persistence for the summary tables.
//!
//! Supports JSON printing and CSV export, optionally gzip-compressed.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serializes `rows` as a headered CSV into any writer.
pub fn write_rows<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes `rows` to `<dir>/<name>.csv`, or `<dir>/<name>.csv.gz` when `gzip` is set.
///
/// Creates `dir` if needed and returns the path written.
pub fn write_table<T: Serialize>(dir: &Path, name: &str, rows: &[T], gzip: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;

    let path = if gzip {
        dir.join(format!("{name}.csv.gz"))
    } else {
        dir.join(format!("{name}.csv"))
    };
    debug!(path = %path.display(), rows = rows.len(), gzip, "Writing table");

    let file =
        File::create(&path).with_context(|| format!("Failed to create '{}'", path.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_rows(&mut encoder, rows)?;
        encoder.finish()?.flush()?;
    } else {
        write_rows(BufWriter::new(file), rows)?;
    }

    info!(path = %path.display(), rows = rows.len(), "Table written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_table;
    use serde::Deserialize;
    use std::env;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        value: Option<f64>,
    }

    fn temp_dir(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "a".to_string(),
                value: Some(1.5),
            },
            Row {
                name: "b".to_string(),
                value: None,
            },
        ]
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&rows()).unwrap();
    }

    #[test]
    fn test_write_rows_header_once() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows()).unwrap();

        let content = String::from_utf8(buf).unwrap();
        assert_eq!(content, "name,value\na,1.5\nb,\n");
    }

    #[test]
    fn test_write_table_creates_directory() {
        let dir = temp_dir("ride_hotspots_test_output_plain");
        let _ = fs::remove_dir_all(&dir);

        let path = write_table(&dir, "rows", &rows(), false).unwrap();

        assert_eq!(path, dir.join("rows.csv"));
        let loaded: Vec<Row> = load_table(&path).unwrap();
        assert_eq!(loaded, rows());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_table_gzip_reads_back() {
        let dir = temp_dir("ride_hotspots_test_output_gzip");
        let _ = fs::remove_dir_all(&dir);

        let path = write_table(&dir, "rows", &rows(), true).unwrap();

        assert_eq!(path, dir.join("rows.csv.gz"));
        let loaded: Vec<Row> = load_table(&path).unwrap();
        assert_eq!(loaded, rows());

        fs::remove_dir_all(&dir).unwrap();
    }
}
