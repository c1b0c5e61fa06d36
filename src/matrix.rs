//! Synchrony matrix assembly
//!
//! For one session and one column, every sliding window of the projected
//! codes is scored against every reference window. Row `i` of the matrix
//! holds the distances of the `i`-th window position, one per reference, in
//! reference order.

use std::num::NonZeroUsize;

use crate::distance::distance;
use crate::error::{Result, SynchronyError};
use crate::projector::ColumnProjector;
use crate::types::{ReferenceSet, Session, SynchronyMatrix, SynchronyRow, SynchronyTable};
use crate::window::{sliding_windows, window_count};

/// Builds synchrony matrices against a validated reference set
#[derive(Debug, Clone)]
pub struct SynchronyMatrixBuilder<'r> {
    references: &'r ReferenceSet,
    window_len: NonZeroUsize,
}

impl<'r> SynchronyMatrixBuilder<'r> {
    pub fn new(references: &'r ReferenceSet) -> Result<Self> {
        let window_len = NonZeroUsize::new(references.window_len())
            .ok_or(SynchronyError::EmptyReferenceWindow { index: 0 })?;
        Ok(Self {
            references,
            window_len,
        })
    }

    /// Score a symbol sequence against every reference window.
    ///
    /// A sequence shorter than the reference length yields an empty matrix.
    pub fn build_from_symbols<S>(&self, symbols: &[S]) -> SynchronyMatrix
    where
        S: AsRef<str>,
    {
        let references: Vec<Vec<&str>> = self
            .references
            .windows()
            .iter()
            .map(|r| r.symbols.iter().map(String::as_str).collect())
            .collect();

        let windows = sliding_windows(symbols, self.window_len);
        let mut rows: Vec<SynchronyRow> = Vec::with_capacity(windows.len());

        for window in windows {
            let observed: Vec<&str> = window.iter().map(AsRef::as_ref).collect();
            rows.push(
                references
                    .iter()
                    .map(|expected| distance(&observed, expected))
                    .collect(),
            );
        }

        debug_assert_eq!(rows.len(), window_count(symbols.len(), self.window_len));
        SynchronyMatrix { rows }
    }

    /// Project `session` through `projector` and score it
    pub fn build(&self, session: &Session, projector: &ColumnProjector) -> Result<SynchronyTable> {
        let symbols = projector.project(session)?;
        Ok(SynchronyTable {
            session_id: session.id.clone(),
            column: projector.name().to_string(),
            labels: self.references.labels(),
            matrix: self.build_from_symbols(&symbols),
        })
    }
}
