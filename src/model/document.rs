//! Document-level types.

use serde::{Deserialize, Serialize};

use super::PageResult;

/// Whether a document carries an extractable text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Every page has text
    Digital,
    /// At least one page is empty or unreadable
    Scanned,
}

impl Classification {
    /// Check if the document needs OCR.
    pub fn is_scanned(self) -> bool {
        self == Classification::Scanned
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Digital => write!(f, "digital"),
            Classification::Scanned => write!(f, "scanned"),
        }
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message produced while processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    /// Create an informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Create a warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Create an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything produced for one input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Display name (usually the file name)
    pub name: String,

    /// Classification, if the document could be opened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    /// Pages that produced text, ascending
    pub pages: Vec<PageResult>,

    /// Messages for the user
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notices: Vec<Notice>,
}

impl DocumentReport {
    /// Create an empty report.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a notice.
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Check if any error notice was recorded.
    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Error)
    }

    /// Number of pages with text.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Reports for a batch of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,

    /// Notices not tied to a single document
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notices: Vec<Notice>,
}

impl BatchReport {
    /// Check if any document recorded an error.
    pub fn has_errors(&self) -> bool {
        self.documents.iter().any(DocumentReport::has_errors)
    }
}

/// Summary of a document for the `info` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// PDF version from the header
    pub version: String,
    pub page_count: u32,
    pub encrypted: bool,
    pub classification: Classification,
}
