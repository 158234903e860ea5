use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;

use crate::error::{CIForecastError, Result};

/// Column name to raw textual value, in source column order.
pub type RawFields = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    Fields { line: u64, fields: RawFields },
    /// The row could not be split into fields (bad UTF-8 and the like).
    Malformed { line: u64, message: String },
}

/// The historical dataset on disk. Every call to [`DatasetSource::open`]
/// starts an independent forward-only reader.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    path: PathBuf,
}

impl DatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<RawRows<File>> {
        let file = File::open(&self.path).map_err(|e| {
            CIForecastError::SourceUnreadable(format!(
                "Failed to open {}: {e}",
                self.path.display()
            ))
        })?;

        RawRows::from_reader(file)
    }
}

/// Streaming iterator over the rows of a comma-separated table.
///
/// Row-level problems are yielded as [`RawRow::Malformed`]; only I/O failure
/// of the underlying stream is an `Err`, after which the iterator is exhausted.
pub struct RawRows<R> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    finished: bool,
}

impl<R: Read> RawRows<R> {
    pub fn from_reader(input: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| {
                CIForecastError::SourceUnreadable(format!("Failed to read CSV headers: {e}"))
            })?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            finished: false,
        })
    }
}

impl<R: Read> Iterator for RawRows<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(false) => {
                self.finished = true;
                None
            }
            Ok(true) => {
                let line = self.record.position().map_or(0, csv::Position::line);
                let fields = self
                    .headers
                    .iter()
                    .zip(self.record.iter())
                    .map(|(header, value)| (header.to_string(), value.to_string()))
                    .collect();

                Some(Ok(RawRow::Fields { line, fields }))
            }
            Err(e) if e.is_io_error() => {
                self.finished = true;
                Some(Err(CIForecastError::SourceUnreadable(format!(
                    "Failed while streaming dataset: {e}"
                ))))
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                Some(Ok(RawRow::Malformed {
                    line,
                    message: e.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows_from(content: &[u8]) -> Vec<RawRow> {
        RawRows::from_reader(content)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_rows_keep_column_order_and_trim_whitespace() {
        let rows = rows_from(b"Test Suite Duration, predicted_duration ,start_day_of_week\n 12.5 ,10,3\n");

        assert_eq!(rows.len(), 1);
        let RawRow::Fields { line, fields } = &rows[0] else {
            panic!("expected a field row");
        };
        assert_eq!(*line, 2);
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["Test Suite Duration", "predicted_duration", "start_day_of_week"]
        );
        assert_eq!(fields["Test Suite Duration"], "12.5");
        assert_eq!(fields["predicted_duration"], "10");
    }

    #[test]
    fn test_short_rows_only_carry_present_columns() {
        let rows = rows_from(b"a,b,c\n1,2\n");

        let RawRow::Fields { fields, .. } = &rows[0] else {
            panic!("expected a field row");
        };
        assert_eq!(fields.len(), 2);
        assert!(!fields.contains_key("c"));
    }

    #[test]
    fn test_invalid_utf8_row_is_malformed_not_fatal() {
        let rows = rows_from(b"a,b\n1,\xff\xfe\n3,4\n");

        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], RawRow::Malformed { .. }));
        assert!(matches!(rows[1], RawRow::Fields { line: 3, .. }));
    }

    #[test]
    fn test_header_only_file_yields_nothing() {
        assert!(rows_from(b"a,b,c\n").is_empty());
    }

    #[test]
    fn test_missing_file_is_source_unreadable() {
        let source = DatasetSource::new("/definitely/not/here/dashboard_data.csv");

        let err = source.open().err().unwrap();
        assert!(matches!(err, CIForecastError::SourceUnreadable(_)));
    }

    #[test]
    fn test_open_streams_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Test Suite,Test Suite Duration").unwrap();
        writeln!(file, "test/unit,42").unwrap();
        writeln!(file, "test/e2e,300").unwrap();

        let source = DatasetSource::new(file.path());
        let rows = source.open().unwrap().collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(source.path(), file.path());
    }
}
