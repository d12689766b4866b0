#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CSV output of crawled records.
//!
//! The file always starts with the header row
//! `kind,repository,organization,timestamp,identifier` followed by one row per
//! record. Timestamps are RFC 3339 in UTC and a missing organization is an
//! empty field. The author is not stored, readers supply it.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use ghactivity_activity_models::{Record, RecordKind};

pub const HEADER: [&str; 5] = [
    "kind",
    "repository",
    "organization",
    "timestamp",
    "identifier",
];

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// The output file could not be created or truncated.
    #[error("Failed to create {}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    /// The input file could not be opened.
    #[error("Failed to open {}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    /// The file does not start with the expected header row.
    #[error("Unexpected header {found:?}")]
    Header { found: Vec<String> },

    /// A row holds a value that cannot be read back.
    #[error("Invalid value on line {line}: {message}")]
    Row { line: u64, message: String },
}

/// Write `records` to `path`, replacing any existing file.
///
/// Returns the number of rows written, header excluded.
///
/// # Errors
///
/// * If the file cannot be created
/// * If writing a row fails
pub fn write_records(path: &Path, records: &[Record]) -> Result<usize, WriterError> {
    let file = File::create(path).map_err(|source| WriterError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(HEADER)?;
    for record in records {
        let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        writer.write_record([
            record.kind.as_ref(),
            record.repository.as_str(),
            record.organization.as_deref().unwrap_or_default(),
            timestamp.as_str(),
            record.identifier.as_str(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// Read records previously written by [`write_records`], attributing them to `author`.
///
/// # Errors
///
/// * If the file cannot be opened
/// * If the header row is not the expected one
/// * If a row is malformed
pub fn read_records(path: &Path, author: &str) -> Result<Vec<Record>, WriterError> {
    let file = File::open(path).map_err(|source| WriterError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let header = reader.headers()?;
    if header.iter().ne(HEADER) {
        return Err(WriterError::Header {
            found: header.iter().map(str::to_string).collect(),
        });
    }

    reader
        .records()
        .map(|row| parse_row(&row?, author))
        .collect()
}

fn parse_row(row: &csv::StringRecord, author: &str) -> Result<Record, WriterError> {
    let line = row.position().map_or(0, csv::Position::line);
    let field = |index| row.get(index).unwrap_or_default();

    let kind = field(0)
        .parse::<RecordKind>()
        .map_err(|_| WriterError::Row {
            line,
            message: format!("unknown kind '{}'", field(0)),
        })?;
    let timestamp = DateTime::parse_from_rfc3339(field(3))
        .map_err(|e| WriterError::Row {
            line,
            message: format!("bad timestamp '{}': {e}", field(3)),
        })?
        .with_timezone(&Utc);
    let organization = Some(field(2))
        .filter(|organization| !organization.is_empty())
        .map(str::to_string);

    Ok(Record {
        kind,
        repository: field(1).to_string(),
        organization,
        timestamp,
        identifier: field(4).to_string(),
        author: author.to_string(),
    })
}
