//! Core data types
//!
//! Records and sessions flow in from a record source; reference windows come
//! from configuration; synchrony matrices flow out to a result sink.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SynchronyError};

/// Attribute names tracked per utterance when none are configured
pub const DEFAULT_ATTRIBUTES: [&str; 6] = ["mean", "mode", "high", "low", "frame_in", "frame_out"];

/// A single categorical code
pub type Symbol = String;

/// Distances for one sliding-window position, one per reference window
pub type SynchronyRow = Vec<usize>;

/// One coded turn within a session. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtteranceRecord {
    pub session_id: String,
    pub turn_id: String,
    pub owner_id: String,
    /// One code per declared attribute, in attribute order
    pub codes: Vec<Symbol>,
}

impl UtteranceRecord {
    pub fn new(
        session_id: impl Into<String>,
        turn_id: impl Into<String>,
        owner_id: impl Into<String>,
        codes: Vec<Symbol>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            turn_id: turn_id.into(),
            owner_id: owner_id.into(),
            codes,
        }
    }
}

/// Utterances sharing one session id, in recorded order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub utterances: Vec<UtteranceRecord>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            utterances: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

/// Selects one categorical column, by position or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

impl From<&str> for ColumnSelector {
    /// Selector text is a name; numeric text falls back to a position when
    /// no declared attribute carries that name (see [`AttributeSet::resolve`]).
    fn from(s: &str) -> Self {
        ColumnSelector::Name(s.trim().to_string())
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Index(i) => write!(f, "#{}", i),
            ColumnSelector::Name(name) => f.write_str(name),
        }
    }
}

/// The ordered, declared set of attribute names carried by every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    names: Vec<String>,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AttributeSet {
    /// Build an attribute set; names must be non-empty and unique.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SynchronyError::Config(
                "at least one attribute must be declared".to_string(),
            ));
        }
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SynchronyError::Config(format!(
                    "attribute {} has an empty name",
                    i
                )));
            }
            if names[..i].contains(name) {
                return Err(SynchronyError::Config(format!(
                    "duplicate attribute name: {}",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Resolve a selector to a position in the attribute set.
    ///
    /// Names win over positions: `"1"` selects an attribute named `1` if one is
    /// declared, and position 1 otherwise.
    pub fn resolve(&self, selector: &ColumnSelector) -> Result<usize> {
        match selector {
            ColumnSelector::Index(i) if *i < self.names.len() => Ok(*i),
            ColumnSelector::Name(name) => self
                .names
                .iter()
                .position(|n| n == name)
                .or_else(|| name.parse::<usize>().ok().filter(|i| *i < self.names.len()))
                .ok_or_else(|| SynchronyError::InvalidColumn(name.clone())),
            other => Err(SynchronyError::InvalidColumn(other.to_string())),
        }
    }
}

/// An externally supplied comparison pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    /// Text the window was written as; used as the output column label
    pub label: String,
    pub symbols: Vec<Symbol>,
}

impl ReferenceWindow {
    /// Parse a reference window string.
    ///
    /// Whitespace-separated text is split into multi-character codes
    /// (`"hi lo hi"`); otherwise every character is one symbol (`"ABAB"`).
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let symbols = if trimmed.contains(char::is_whitespace) {
            trimmed.split_whitespace().map(str::to_string).collect()
        } else {
            trimmed.chars().map(|c| c.to_string()).collect()
        };
        Self {
            label: trimmed.to_string(),
            symbols,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// An ordered, non-empty set of reference windows that all share one length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    windows: Vec<ReferenceWindow>,
}

impl ReferenceSet {
    /// Validate reference windows: at least one, none empty, all the same length.
    ///
    /// The first window's length is the expected length.
    pub fn new(windows: Vec<ReferenceWindow>) -> Result<Self> {
        let first = windows.first().ok_or(SynchronyError::NoReferenceWindows)?;
        let expected = first.len();

        for (index, window) in windows.iter().enumerate() {
            if window.is_empty() {
                return Err(SynchronyError::EmptyReferenceWindow { index });
            }
            if window.len() != expected {
                return Err(SynchronyError::MismatchedWindowLength {
                    label: window.label.clone(),
                    expected,
                    found: window.len(),
                });
            }
        }

        Ok(Self { windows })
    }

    /// Parse and validate reference window strings
    pub fn parse<I, S>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| ReferenceWindow::parse(t.as_ref()))
                .collect(),
        )
    }

    pub fn windows(&self) -> &[ReferenceWindow] {
        &self.windows
    }

    /// Shared length of every window in the set
    pub fn window_len(&self) -> usize {
        self.windows[0].len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.windows.iter().map(|w| w.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Distances of every sliding window against every reference window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronyMatrix {
    pub rows: Vec<SynchronyRow>,
}

impl SynchronyMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A synchrony matrix labelled with the session, column and references it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronyTable {
    pub session_id: String,
    pub column: String,
    pub labels: Vec<String>,
    pub matrix: SynchronyMatrix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attributes() {
        let attrs = AttributeSet::default();
        assert_eq!(attrs.len(), 6);
        assert_eq!(attrs.name(4), Some("frame_in"));
    }

    #[test]
    fn test_resolve_by_name_and_index() {
        let attrs = AttributeSet::default();
        assert_eq!(attrs.resolve(&ColumnSelector::from("low")).unwrap(), 3);
        assert_eq!(attrs.resolve(&ColumnSelector::from("5")).unwrap(), 5);
    }

    #[test]
    fn test_numeric_attribute_names_win_over_positions() {
        let attrs = AttributeSet::new(["1", "2"]).unwrap();
        assert_eq!(attrs.resolve(&ColumnSelector::from("1")).unwrap(), 0);
        assert_eq!(attrs.resolve(&ColumnSelector::from("2")).unwrap(), 1);
        assert_eq!(attrs.resolve(&ColumnSelector::from("0")).unwrap(), 0);
        assert!(matches!(
            attrs.resolve(&ColumnSelector::from("3")),
            Err(SynchronyError::InvalidColumn(name)) if name == "3"
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_column() {
        let attrs = AttributeSet::default();
        assert!(matches!(
            attrs.resolve(&ColumnSelector::from("pitch")),
            Err(SynchronyError::InvalidColumn(name)) if name == "pitch"
        ));
        assert!(matches!(
            attrs.resolve(&ColumnSelector::Index(6)),
            Err(SynchronyError::InvalidColumn(_))
        ));
    }

    #[test]
    fn test_attribute_set_rejects_duplicates() {
        let result = AttributeSet::new(["mean", "mode", "mean"]);
        assert!(matches!(result, Err(SynchronyError::Config(_))));
    }

    #[test]
    fn test_reference_window_parsing() {
        let chars = ReferenceWindow::parse("ABAB");
        assert_eq!(chars.symbols, vec!["A", "B", "A", "B"]);
        assert_eq!(chars.label, "ABAB");

        let codes = ReferenceWindow::parse("hi lo  hi");
        assert_eq!(codes.symbols, vec!["hi", "lo", "hi"]);
    }

    #[test]
    fn test_reference_set_rejects_mismatched_lengths() {
        let result = ReferenceSet::parse(["AB", "ABA"]);
        match result {
            Err(SynchronyError::MismatchedWindowLength {
                label,
                expected,
                found,
            }) => {
                assert_eq!(label, "ABA");
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected mismatched length error, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_set_rejects_empty_window() {
        assert!(matches!(
            ReferenceSet::parse(["", "AB"]),
            Err(SynchronyError::EmptyReferenceWindow { index: 0 })
        ));
        assert!(matches!(
            ReferenceSet::parse(Vec::<String>::new()),
            Err(SynchronyError::NoReferenceWindows)
        ));
    }
}
