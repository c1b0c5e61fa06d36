//! Session grouping
//!
//! Partitions an ordered record stream into sessions by contiguous runs of
//! session id. Non-adjacent runs with the same id stay separate sessions.

use crate::error::Result;
use crate::types::{Session, UtteranceRecord};

/// Incremental accumulator that closes a session whenever the session id changes.
///
/// The accumulator starts as an empty session with an empty id, so the first
/// real record closes it and the raw output always begins with that empty
/// sentinel. Use [`discard_leading_sentinel`] (or [`group_sessions`]) to drop it.
#[derive(Debug, Default)]
pub struct SessionGrouper {
    sessions: Vec<Session>,
    current: Session,
}

impl SessionGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, closing the current session if the id changes
    pub fn push(&mut self, record: UtteranceRecord) {
        if record.session_id != self.current.id || (self.sessions.is_empty() && self.is_pristine()) {
            let next = Session::new(record.session_id.clone());
            self.sessions.push(std::mem::replace(&mut self.current, next));
        }
        self.current.utterances.push(record);
    }

    /// Close the final session and return every session, sentinel included
    pub fn finish(mut self) -> Vec<Session> {
        self.sessions.push(self.current);
        self.sessions
    }

    /// Number of sessions closed so far
    pub fn closed(&self) -> usize {
        self.sessions.len()
    }

    fn is_pristine(&self) -> bool {
        self.current.id.is_empty() && self.current.is_empty()
    }
}

/// Drop the session at index 0 if, and only if, it holds no utterances
pub fn discard_leading_sentinel(mut sessions: Vec<Session>) -> Vec<Session> {
    if sessions.first().is_some_and(Session::is_empty) {
        sessions.remove(0);
    }
    sessions
}

/// Group records into sessions, without the leading sentinel.
///
/// Stops at the first failing record and returns its error.
pub fn group_sessions<I>(records: I) -> Result<Vec<Session>>
where
    I: IntoIterator<Item = Result<UtteranceRecord>>,
{
    let mut grouper = SessionGrouper::new();
    for record in records {
        grouper.push(record?);
    }
    Ok(discard_leading_sentinel(grouper.finish()))
}
