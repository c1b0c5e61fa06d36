//! Utterance Synchrony - edit-distance synchrony analysis of coded sessions
//!
//! Ordered utterance records are grouped into sessions; each categorical
//! column of a session is projected into a symbol sequence, cut into sliding
//! windows, and every window is scored against a set of reference windows by
//! Levenshtein distance. Lower distance means higher synchrony.
//!
//! Pipeline: record source → session grouping → column projection →
//! sliding windows → edit distance → synchrony matrix → result sink.

pub mod config;
pub mod distance;
pub mod error;
pub mod grouping;
pub mod matrix;
pub mod pipeline;
pub mod projector;
pub mod sink;
pub mod source;
pub mod types;
pub mod window;

pub use config::{AnalysisPlan, OutputLayout, SynchronyConfig};
pub use distance::{distance, DistanceTable};
pub use error::{Result, SynchronyError};
pub use grouping::{discard_leading_sentinel, group_sessions, SessionGrouper};
pub use matrix::SynchronyMatrixBuilder;
pub use pipeline::{RunSummary, SynchronyProcessor};
pub use projector::ColumnProjector;
pub use sink::{sink_from_config, CsvCombinedSink, CsvDirectorySink, MemorySink, ResultSink};
pub use source::{CsvRecordSource, MemorySource, RecordSource};
pub use types::{
    AttributeSet, ColumnSelector, ReferenceSet, ReferenceWindow, Session, SynchronyMatrix,
    SynchronyRow, SynchronyTable, UtteranceRecord,
};
pub use window::{sliding_windows, window_count, SlidingWindows};

/// Crate version, reported by the CLI
pub const SYNCHRONY_VERSION: &str = env!("CARGO_PKG_VERSION");
