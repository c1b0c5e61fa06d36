//! Column projection
//!
//! Turns a session into the sequence of codes for one categorical column.

use crate::error::{Result, SynchronyError};
use crate::types::{AttributeSet, ColumnSelector, Session, Symbol};

/// Projects sessions onto a single, already-resolved attribute column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjector {
    index: usize,
    name: String,
}

impl ColumnProjector {
    /// Resolve `selector` against the declared attributes.
    ///
    /// Fails with [`SynchronyError::InvalidColumn`] before any session is touched.
    pub fn new(attributes: &AttributeSet, selector: &ColumnSelector) -> Result<Self> {
        let index = attributes.resolve(selector)?;
        let name = attributes
            .name(index)
            .ok_or_else(|| SynchronyError::InvalidColumn(selector.to_string()))?
            .to_string();
        Ok(Self { index, name })
    }

    /// Projectors for every declared attribute, in declaration order
    pub fn all(attributes: &AttributeSet) -> Vec<Self> {
        attributes
            .names()
            .iter()
            .enumerate()
            .map(|(index, name)| Self {
                index,
                name: name.clone(),
            })
            .collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One symbol per utterance, in record order
    pub fn project<'s>(&self, session: &'s Session) -> Result<Vec<&'s Symbol>> {
        session
            .utterances
            .iter()
            .map(|u| {
                u.codes
                    .get(self.index)
                    .ok_or_else(|| SynchronyError::MissingCode {
                        session_id: session.id.clone(),
                        turn_id: u.turn_id.clone(),
                        column: self.name.clone(),
                    })
            })
            .collect()
    }
}
