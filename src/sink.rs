//! Result sinks
//!
//! Sinks persist synchrony tables as flat CSV. Tables arrive in the
//! deterministic session-then-column order and are written in that order.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tracing::debug;

use crate::config::{OutputLayout, SynchronyConfig};
use crate::error::{Result, SynchronyError};
use crate::types::SynchronyTable;

/// Destination for computed synchrony tables
pub trait ResultSink {
    fn write_table(&mut self, table: &SynchronyTable) -> Result<()>;

    /// Flush anything buffered; called once after the last table
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects tables in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<SynchronyTable>,
}

impl ResultSink for MemorySink {
    fn write_table(&mut self, table: &SynchronyTable) -> Result<()> {
        self.tables.push(table.clone());
        Ok(())
    }
}

/// One CSV file per (session, column) inside a directory.
///
/// Each file starts with a `window` + reference-label header, followed by one
/// row per window position: the position index, then one distance per reference.
#[derive(Debug)]
pub struct CsvDirectorySink {
    dir: PathBuf,
    delimiter: u8,
    written: Vec<PathBuf>,
}

impl CsvDirectorySink {
    pub fn new(dir: impl Into<PathBuf>, delimiter: u8) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            delimiter,
            written: Vec::new(),
        })
    }

    /// Paths of files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// File name for a table: `<session>__<column>.csv`, sanitized.
    ///
    /// Non-adjacent runs of one session id produce repeated names; later
    /// occurrences get a numeric suffix so no table is overwritten.
    fn path_for(&self, table: &SynchronyTable) -> PathBuf {
        let stem = format!(
            "{}__{}",
            sanitize(&table.session_id),
            sanitize(&table.column)
        );
        let mut path = self.dir.join(format!("{}.csv", stem));
        let mut n = 1;
        while self.written.contains(&path) {
            n += 1;
            path = self.dir.join(format!("{}.{}.csv", stem, n));
        }
        path
    }
}

impl ResultSink for CsvDirectorySink {
    fn write_table(&mut self, table: &SynchronyTable) -> Result<()> {
        let path = self.path_for(table);
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&path)?;

        let mut header = vec!["window".to_string()];
        header.extend(table.labels.iter().cloned());
        writer.write_record(&header)?;

        for (position, row) in table.matrix.rows.iter().enumerate() {
            let mut fields = vec![position.to_string()];
            fields.extend(row.iter().map(usize::to_string));
            writer.write_record(&fields)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = table.matrix.row_count(), "wrote table");
        self.written.push(path);
        Ok(())
    }
}

/// All tables in a single CSV file with `session, column, window, <labels...>` columns.
///
/// A table with no window positions still gets one row, with empty window and
/// distance fields, so every scored session appears in the file.
pub struct CsvCombinedSink {
    writer: Writer<File>,
    labels: Option<Vec<String>>,
}

impl CsvCombinedSink {
    pub fn new(path: &Path, delimiter: u8) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
        Ok(Self {
            writer,
            labels: None,
        })
    }
}

impl ResultSink for CsvCombinedSink {
    fn write_table(&mut self, table: &SynchronyTable) -> Result<()> {
        match &self.labels {
            None => {
                let mut header: Vec<String> =
                    vec!["session".into(), "column".into(), "window".into()];
                header.extend(table.labels.iter().cloned());
                self.writer.write_record(&header)?;
                self.labels = Some(table.labels.clone());
            }
            Some(labels) if labels != &table.labels => {
                return Err(SynchronyError::Config(format!(
                    "table labels {:?} differ from header {:?}",
                    table.labels, labels
                )));
            }
            Some(_) => {}
        }

        if table.matrix.is_empty() {
            let mut fields = vec![table.session_id.clone(), table.column.clone(), String::new()];
            fields.extend(table.labels.iter().map(|_| String::new()));
            self.writer.write_record(&fields)?;
            return Ok(());
        }

        for (position, row) in table.matrix.rows.iter().enumerate() {
            let mut fields = vec![
                table.session_id.clone(),
                table.column.clone(),
                position.to_string(),
            ];
            fields.extend(row.iter().map(usize::to_string));
            self.writer.write_record(&fields)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Build the sink the configuration asks for
pub fn sink_from_config(config: &SynchronyConfig) -> Result<Box<dyn ResultSink>> {
    let destination = config
        .destination
        .as_deref()
        .ok_or_else(|| SynchronyError::Config("no destination configured".to_string()))?;
    let delimiter = config.delimiter_byte()?;

    Ok(match config.layout {
        OutputLayout::PerTable => Box::new(CsvDirectorySink::new(destination, delimiter)?),
        OutputLayout::Combined => Box::new(CsvCombinedSink::new(destination, delimiter)?),
    })
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}
