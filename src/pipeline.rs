//! Pipeline orchestration
//!
//! Two phases: ingest (read every record and close sessions), then analysis
//! (score every session and column against the reference windows). Tables are
//! produced session by session, and within a session column by column, in
//! configuration order.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AnalysisPlan, SynchronyConfig};
use crate::error::Result;
use crate::grouping::{discard_leading_sentinel, SessionGrouper};
use crate::matrix::SynchronyMatrixBuilder;
use crate::sink::ResultSink;
use crate::source::RecordSource;
use crate::types::{Session, SynchronyTable};

/// Totals for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub sessions: usize,
    pub tables: usize,
    pub rows: usize,
}

/// Validated configuration plus the operations that run it
#[derive(Debug, Clone)]
pub struct SynchronyProcessor {
    config: SynchronyConfig,
    plan: AnalysisPlan,
}

impl SynchronyProcessor {
    /// Validate `config`; nothing is read until [`run`](Self::run) is called.
    pub fn new(config: SynchronyConfig) -> Result<Self> {
        let plan = config.validate()?;
        Ok(Self { config, plan })
    }

    pub fn config(&self) -> &SynchronyConfig {
        &self.config
    }

    pub fn plan(&self) -> &AnalysisPlan {
        &self.plan
    }

    /// Read every record from `source` and close sessions by contiguous id runs
    pub fn ingest<S: RecordSource>(&self, source: &mut S) -> Result<Vec<Session>> {
        let mut grouper = SessionGrouper::new();
        let mut records = 0usize;
        let mut last_id: Option<String> = None;

        for record in source.records() {
            let record = record?;
            if last_id.as_deref() != Some(record.session_id.as_str()) {
                debug!(
                    previous = last_id.as_deref().unwrap_or(""),
                    next = %record.session_id,
                    "session boundary"
                );
                last_id = Some(record.session_id.clone());
            }
            grouper.push(record);
            records += 1;
        }

        let sessions = discard_leading_sentinel(grouper.finish());
        debug!(records, sessions = sessions.len(), "ingest complete");
        Ok(sessions)
    }

    /// Score every session against every configured column
    pub fn analyze_sessions(&self, sessions: &[Session]) -> Result<Vec<SynchronyTable>> {
        let builder = SynchronyMatrixBuilder::new(&self.plan.references)?;
        let mut tables = Vec::with_capacity(sessions.len() * self.plan.projectors.len());

        for session in sessions {
            for projector in &self.plan.projectors {
                let table = builder.build(session, projector)?;
                debug!(
                    session = %table.session_id,
                    column = %table.column,
                    utterances = session.len(),
                    rows = table.matrix.row_count(),
                    "scored session column"
                );
                tables.push(table);
            }
        }

        Ok(tables)
    }

    /// Ingest, analyze, and hand every table to `sink`
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: RecordSource,
        K: ResultSink + ?Sized,
    {
        let sessions = self.ingest(source)?;
        let tables = self.analyze_sessions(&sessions)?;

        let mut summary = RunSummary {
            records: sessions.iter().map(Session::len).sum(),
            sessions: sessions.len(),
            ..Default::default()
        };

        for table in &tables {
            sink.write_table(table)?;
            summary.tables += 1;
            summary.rows += table.matrix.row_count();
        }
        sink.finish()?;

        info!(
            records = summary.records,
            sessions = summary.sessions,
            tables = summary.tables,
            rows = summary.rows,
            references = self.plan.references.len(),
            "synchrony run complete"
        );
        Ok(summary)
    }
}
