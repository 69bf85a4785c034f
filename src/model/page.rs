//! Page-level types.

use serde::{Deserialize, Serialize};

/// Extracted text of a single page.
///
/// Only pages that produced text are represented; a `PageResult` never
/// carries an empty or whitespace-only string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub number: u32,

    /// Extracted text
    pub text: String,
}

impl PageResult {
    /// Create a new page result.
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Result of running one text pass over one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PageExtractionOutcome {
    /// The page produced text
    Text(String),
    /// The page produced nothing, or only whitespace
    Empty,
    /// The page could not be read
    Failed(String),
}

impl PageExtractionOutcome {
    /// Classify raw extracted text. Whitespace-only text counts as empty.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            PageExtractionOutcome::Empty
        } else {
            PageExtractionOutcome::Text(text)
        }
    }

    /// Build an outcome from a fallible text pass.
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::from_text(text),
            Err(e) => PageExtractionOutcome::Failed(e.to_string()),
        }
    }

    /// Check if the page produced text.
    pub fn is_text(&self) -> bool {
        matches!(self, PageExtractionOutcome::Text(_))
    }

    /// Borrow the text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            PageExtractionOutcome::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Take the text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            PageExtractionOutcome::Text(text) => Some(text),
            _ => None,
        }
    }
}
