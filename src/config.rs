//! Run configuration
//!
//! A single explicit configuration value is built once (from a TOML file,
//! command-line flags, or both) and handed to the pipeline. Validation turns
//! it into an [`AnalysisPlan`] before any input is read.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SynchronyError};
use crate::projector::ColumnProjector;
use crate::types::{AttributeSet, ColumnSelector, ReferenceSet, DEFAULT_ATTRIBUTES};

/// How result tables are laid out at the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One CSV file per (session, column) in a destination directory
    #[default]
    PerTable,
    /// All tables in one CSV file, prefixed with session and column
    Combined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynchronyConfig {
    /// Reference patterns to compare against, in output column order
    pub reference_windows: Vec<String>,
    /// Input CSV path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Output directory (per-table layout) or file (combined layout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    pub verbose: bool,
    /// Declared attribute names, in record column order
    pub attributes: Vec<String>,
    /// Attributes to analyze; empty means all of them
    pub columns: Vec<String>,
    pub has_headers: bool,
    pub delimiter: char,
    pub layout: OutputLayout,
}

impl Default for SynchronyConfig {
    fn default() -> Self {
        Self {
            reference_windows: Vec::new(),
            source: None,
            destination: None,
            verbose: false,
            attributes: DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            columns: Vec::new(),
            has_headers: false,
            delimiter: ',',
            layout: OutputLayout::PerTable,
        }
    }
}

/// Everything the analysis needs, checked up front
#[derive(Debug, Clone)]
pub struct AnalysisPlan {
    pub attributes: AttributeSet,
    pub projectors: Vec<ColumnProjector>,
    pub references: ReferenceSet,
}

impl SynchronyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SynchronyError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SynchronyError::Config(e.to_string()))
    }

    /// Delimiter as the single byte the CSV reader and writer expect
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SynchronyError::Config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }

    /// Check references, attributes and column selection.
    ///
    /// Reference windows must be non-empty and share one length; columns must
    /// name declared attributes.
    pub fn validate(&self) -> Result<AnalysisPlan> {
        let references = ReferenceSet::parse(&self.reference_windows)?;
        let attributes = AttributeSet::new(self.attributes.iter().cloned())?;
        self.delimiter_byte()?;

        let projectors = if self.columns.is_empty() {
            ColumnProjector::all(&attributes)
        } else {
            let mut projectors: Vec<ColumnProjector> = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                let selector = ColumnSelector::from(column.as_str());
                let projector = ColumnProjector::new(&attributes, &selector)?;
                if projectors.iter().any(|p| p.index() == projector.index()) {
                    return Err(SynchronyError::Config(format!(
                        "column selected twice: {}",
                        projector.name()
                    )));
                }
                projectors.push(projector);
            }
            projectors
        };

        Ok(AnalysisPlan {
            attributes,
            projectors,
            references,
        })
    }
}
