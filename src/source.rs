//! Record sources
//!
//! Rows are laid out as `session_id, owner_id, turn_id, <attr_1>, ..., <attr_k>`
//! with one code column per declared attribute. Sources must deliver rows in
//! session-contiguous order; they are never re-sorted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::config::SynchronyConfig;
use crate::error::{Result, SynchronyError};
use crate::types::{AttributeSet, UtteranceRecord};

/// Number of identifying columns before the attribute codes
pub const KEY_COLUMNS: usize = 3;

const KEY_NAMES: [&str; KEY_COLUMNS] = ["session_id", "owner_id", "turn_id"];

/// An ordered stream of utterance records
pub trait RecordSource {
    /// The next record in source order, or `None` once the source is exhausted
    fn next_record(&mut self) -> Option<Result<UtteranceRecord>>;

    /// Drain the source as an iterator
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records { source: self }
    }
}

/// Iterator over the remaining records of a [`RecordSource`]
pub struct Records<'s, S> {
    source: &'s mut S,
}

impl<S: RecordSource> Iterator for Records<'_, S> {
    type Item = Result<UtteranceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_record()
    }
}

/// In-memory source, mostly for tests and library callers
#[derive(Debug)]
pub struct MemorySource {
    records: std::vec::IntoIter<UtteranceRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<UtteranceRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordSource for MemorySource {
    fn next_record(&mut self) -> Option<Result<UtteranceRecord>> {
        self.records.next().map(Ok)
    }
}

/// Reads utterance rows from delimited text
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    attribute_count: usize,
    row: StringRecord,
    failed: bool,
}

impl CsvRecordSource<File> {
    /// Open the configured source file
    pub fn from_config(config: &SynchronyConfig, attributes: &AttributeSet) -> Result<Self> {
        let path = config
            .source
            .as_deref()
            .ok_or_else(|| SynchronyError::Config("no source file configured".to_string()))?;
        Self::from_path(path, attributes, config.has_headers, config.delimiter_byte()?)
    }

    pub fn from_path(
        path: &Path,
        attributes: &AttributeSet,
        has_headers: bool,
        delimiter: u8,
    ) -> Result<Self> {
        debug!(path = %path.display(), has_headers, "opening record source");
        let file = File::open(path)?;
        Self::from_reader(file, attributes, has_headers, delimiter)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(
        input: R,
        attributes: &AttributeSet,
        has_headers: bool,
        delimiter: u8,
    ) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        if has_headers {
            check_headers(reader.headers()?, attributes)?;
        }

        Ok(Self {
            reader,
            attribute_count: attributes.len(),
            row: StringRecord::new(),
            failed: false,
        })
    }

    fn parse_row(&self) -> Result<UtteranceRecord> {
        let line = self.row.position().map(|p| p.line()).unwrap_or(0);
        let expected = KEY_COLUMNS + self.attribute_count;

        if self.row.len() != expected {
            return Err(SynchronyError::InputFormat {
                line,
                reason: format!("expected {} fields, found {}", expected, self.row.len()),
            });
        }

        for (i, field) in self.row.iter().enumerate() {
            if field.is_empty() {
                let name = KEY_NAMES
                    .get(i)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("code {}", i - KEY_COLUMNS));
                return Err(SynchronyError::InputFormat {
                    line,
                    reason: format!("missing {}", name),
                });
            }
        }

        Ok(UtteranceRecord {
            session_id: self.row[0].to_string(),
            owner_id: self.row[1].to_string(),
            turn_id: self.row[2].to_string(),
            codes: self.row.iter().skip(KEY_COLUMNS).map(str::to_string).collect(),
        })
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn next_record(&mut self) -> Option<Result<UtteranceRecord>> {
        if self.failed {
            return None;
        }
        let parsed = match self.reader.read_record(&mut self.row) {
            Ok(true) => self.parse_row(),
            Ok(false) => return None,
            Err(e) => Err(e.into()),
        };
        self.failed = parsed.is_err();
        Some(parsed)
    }
}

/// An input with no header row at all is accepted as holding zero records.
fn check_headers(headers: &StringRecord, attributes: &AttributeSet) -> Result<()> {
    if headers.is_empty() {
        return Ok(());
    }
    let found: Vec<&str> = headers.iter().skip(KEY_COLUMNS).collect();
    let declared: Vec<&str> = attributes.names().iter().map(String::as_str).collect();
    if headers.len() != KEY_COLUMNS + attributes.len() || found != declared {
        return Err(SynchronyError::Config(format!(
            "header attributes {:?} do not match declared attributes {:?}",
            found, declared
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_sessions;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn single() -> AttributeSet {
        AttributeSet::new(["type"]).unwrap()
    }

    fn read_all(
        text: &str,
        attrs: &AttributeSet,
        has_headers: bool,
    ) -> Vec<Result<UtteranceRecord>> {
        let mut source =
            CsvRecordSource::from_reader(text.as_bytes(), attrs, has_headers, b',').unwrap();
        source.records().collect()
    }

    #[test]
    fn test_reads_rows_in_order() {
        let rows = read_all("s1,m1,1,A\ns1,p1,2,B\ns2,m1,1,A\n", &single(), false);
        let records: Vec<UtteranceRecord> = rows.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            UtteranceRecord::new("s1", "2", "p1", vec!["B".to_string()])
        );
        assert_eq!(records[2].session_id, "s2");
    }

    #[test]
    fn test_multi_attribute_rows() {
        let rows = read_all(
            "session_id,owner_id,turn_id,mean,mode,high,low,frame_in,frame_out\n\
             s1,m1,1,A,B,C,D,E,F\n",
            &AttributeSet::default(),
            true,
        );
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.codes, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_header_mismatch() {
        let result = CsvRecordSource::from_reader(
            "session_id,owner_id,turn_id,pitch\n".as_bytes(),
            &single(),
            true,
            b',',
        );
        assert!(matches!(result, Err(SynchronyError::Config(_))));
    }

    #[test]
    fn test_empty_input_with_headers_has_no_records() {
        let rows = read_all("", &single(), true);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_field_reports_line() {
        let rows = read_all("s1,m1,1,A\ns1,m1,2\ns1,m1,3,A\n", &single(), false);
        assert_eq!(rows.len(), 2, "reading stops at the first malformed row");
        assert!(matches!(
            rows[1],
            Err(SynchronyError::InputFormat { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_session_id_is_malformed() {
        let rows = read_all(",m1,1,A\n", &single(), false);
        match &rows[0] {
            Err(SynchronyError::InputFormat { line, reason }) => {
                assert_eq!(*line, 1);
                assert!(reason.contains("session_id"));
            }
            other => panic!("expected input format error, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_are_malformed() {
        let rows = read_all("s1,m1,1,A,B\n", &single(), false);
        assert!(matches!(rows[0], Err(SynchronyError::InputFormat { .. })));
    }

    #[test]
    fn test_custom_delimiter_and_whitespace() {
        let mut source =
            CsvRecordSource::from_reader("s1; m1; 1; A\n".as_bytes(), &single(), false, b';').unwrap();
        let record = source.next_record().unwrap().unwrap();
        assert_eq!(record.owner_id, "m1");
        assert_eq!(record.codes, vec!["A"]);
    }

    #[test]
    fn test_file_source_feeds_grouping() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a,m,1,A\na,p,2,B\nb,m,1,A\n\na,m,1,B\n").unwrap();

        let mut source = CsvRecordSource::from_path(file.path(), &single(), false, b',').unwrap();
        let sessions = group_sessions(source.records()).unwrap();
        let sizes: Vec<(&str, usize)> = sessions.iter().map(|s| (s.id.as_str(), s.len())).collect();
        assert_eq!(sizes, vec![("a", 2), ("b", 1), ("a", 1)]);
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new(vec![UtteranceRecord::new(
            "s1",
            "1",
            "m1",
            vec!["A".to_string()],
        )]);
        assert!(source.next_record().is_some());
        assert!(source.next_record().is_none());
    }
}
