//! Error types for pdftriage.
//!
//! Most of these never reach the user directly: per-page failures become
//! [`PageExtractionOutcome::Failed`](crate::PageExtractionOutcome) and
//! pipeline failures become notices. They surface as `Err` only from the
//! byte-level functions and the OCR engines.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for pdftriage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading input or staging OCR files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No `%PDF-` header near the start of the data.
    #[error("Not a PDF file")]
    UnknownFormat,

    /// The header is present but its version field is malformed.
    #[error("Malformed PDF version '{0}'")]
    UnsupportedVersion(String),

    /// lopdf could not parse the document structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    #[error("Document is encrypted")]
    Encrypted,

    /// A page's content could not be turned into glyphs.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Requested page, then page count.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A page selection string could not be parsed.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The OCR engine ran but failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The OCR engine could not be started.
    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    /// The OCR engine exceeded its time budget and was stopped.
    #[error("OCR timed out after {}s", .0.as_secs())]
    OcrTimeout(Duration),

    /// Report serialization failed.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether the error comes from the OCR step rather than the document.
    pub fn is_ocr(&self) -> bool {
        matches!(
            self,
            Error::Ocr(_) | Error::OcrUnavailable(_) | Error::OcrTimeout(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            other => Error::PdfParse(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::UnknownFormat.to_string(), "Not a PDF file");
        assert_eq!(
            Error::PageOutOfRange(4, 3).to_string(),
            "Page 4 is out of range (document has 3 pages)"
        );
        assert_eq!(
            Error::OcrTimeout(Duration::from_secs(300)).to_string(),
            "OCR timed out after 300s"
        );
        assert_eq!(
            Error::OcrUnavailable("'ocrmypdf' not found".into()).to_string(),
            "OCR engine unavailable: 'ocrmypdf' not found"
        );
    }

    #[test]
    fn test_is_ocr() {
        assert!(Error::Ocr("exit 2".into()).is_ocr());
        assert!(Error::OcrTimeout(Duration::from_secs(1)).is_ocr());
        assert!(!Error::Encrypted.is_ocr());
    }

    #[test]
    fn test_io_conversion() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
