//! Data loading
//!
//! Reads a delimited text file with a header row into an untyped table of
//! trimmed string fields. Typing and renaming happen in [`crate::normalize`].

use crate::error::{AnalysisError, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One data record together with its 1-based line number in the source
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Structure representing a loaded delimited file
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names from the header row
    pub headers: Vec<String>,

    /// Data records, in file order
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Load a table from a CSV file
    pub fn from_csv(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_reader(file, delimiter)?;
        debug!(
            "loaded {} records with {} columns from {}",
            table.records.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse CSV content already held in memory
    pub fn parse_csv(content: &str, delimiter: u8) -> Result<Self> {
        Self::from_reader(content.as_bytes(), delimiter)
    }

    fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                // Spreadsheet exports often prefix the first header with a BOM
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AnalysisError::EmptyInput);
        }

        let mut records = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            records.push(RawRecord {
                line,
                fields: record.iter().map(String::from).collect(),
            });
        }

        Ok(RawTable { headers, records })
    }

    /// Index of a column by exact header name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
