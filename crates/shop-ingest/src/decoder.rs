//! Row decoder for delimited sources
//!
//! Turns a byte stream with a header row into a lazy sequence of [`Row`]s.
//! No type coercion happens here; cells stay strings until an entity schema
//! decodes them.

use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::io::Read;

use crate::error::DecodeError;

/// One data row: column name to trimmed cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    ordinal: u64,
    cells: BTreeMap<String, String>,
}

impl Row {
    /// Build a row directly from column/value pairs
    pub fn from_pairs<K, V>(ordinal: u64, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            ordinal,
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 1-based position among the data rows
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Raw cell text, `None` when the column is not in the header
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// Pull-based reader over a delimited source.
///
/// Iteration stops for good after the first [`DecodeError`].
pub struct RowDecoder<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    record: StringRecord,
    next_ordinal: u64,
    finished: bool,
}

impl<R: Read> RowDecoder<R> {
    /// Read the header row from `source`
    pub fn new(source: R, delimiter: u8) -> Result<Self, DecodeError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(false)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|source| DecodeError::Malformed { row: 0, source })?
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim().to_string())
            .collect();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            next_ordinal: 1,
            finished: false,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Fail unless every column in `expected` is present in the header
    pub fn require_columns(&self, expected: &[&str]) -> Result<(), DecodeError> {
        let missing: Vec<String> = expected
            .iter()
            .filter(|column| !self.headers.iter().any(|h| h == *column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::MissingColumns { missing })
        }
    }
}

impl<R: Read> Iterator for RowDecoder<R> {
    type Item = Result<Row, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let ordinal = self.next_ordinal;
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.next_ordinal += 1;
                let cells = self
                    .headers
                    .iter()
                    .zip(self.record.iter())
                    .map(|(column, value)| (column.clone(), value.trim().to_string()))
                    .collect();
                Some(Ok(Row { ordinal, cells }))
            },
            Ok(false) => {
                self.finished = true;
                None
            },
            Err(source) => {
                self.finished = true;
                Some(Err(DecodeError::Malformed {
                    row: ordinal,
                    source,
                }))
            },
        }
    }
}
