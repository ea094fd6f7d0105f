//! CSV loaders for the trip log and for previously exported tables.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::trip::RawTrip;

/// Decodes every row of a headered CSV stream into `T`.
///
/// # Errors
///
/// Returns an error naming the failing record if a row cannot be decoded.
pub fn parse_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result.context("Failed to decode CSV record")?;
        rows.push(record);
    }

    Ok(rows)
}

/// Decodes a trip log from any CSV stream.
pub fn parse_trips<R: Read>(reader: R) -> Result<Vec<RawTrip>> {
    parse_rows(reader)
}

/// Opens `path` for reading, transparently decompressing `.gz` files.
pub fn open_table(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(path = %path.display(), gzipped, "Opening table");

    if gzipped {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Loads a table of `T` rows from a CSV (or `.csv.gz`) file.
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = open_table(path)?;
    parse_rows(reader).with_context(|| format!("Failed to load '{}'", path.display()))
}

/// Loads the raw trip log from a CSV (or `.csv.gz`) file.
pub fn load_trips(path: &Path) -> Result<Vec<RawTrip>> {
    load_table(path)
}
