//! # pdftriage
//!
//! Scanned-versus-digital PDF triage and layout-aware text extraction.
//!
//! Each document is first classified: if every page carries a text layer it
//! is *digital* and its text is extracted directly; otherwise it is
//! *scanned* and is either sent through an OCR engine or skipped.
//! Extraction places words on a character grid controlled by four
//! [`ExtractionParameters`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdftriage::{Pipeline, render};
//!
//! fn main() -> pdftriage::Result<()> {
//!     let data = std::fs::read("document.pdf")?;
//!
//!     let report = Pipeline::without_ocr().process("document.pdf", &data);
//!     println!("{}", render::render_document(&report));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Interactive use
//!
//! [`Session`] parses a document once and re-runs only the layout pass when
//! the parameters change:
//!
//! ```no_run
//! use pdftriage::{ExtractionParameters, Session};
//!
//! let data = std::fs::read("document.pdf").unwrap();
//! let session = Session::open(&data).unwrap();
//! let params = ExtractionParameters::default().with_x_density(7.5);
//! println!("{:?}", session.extract_page(1, &params));
//! ```

pub mod classify;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use classify::classify;
pub use detect::{detect_format_from_bytes, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use extract::{extract_digital, extract_page, extract_scanned};
pub use model::{
    BatchReport, Classification, DocumentInfo, DocumentReport, Notice, NoticeLevel,
    PageExtractionOutcome, PageResult,
};
pub use ocr::{OcrConfig, OcrEngine, OcrMyPdf};
pub use parser::{
    ExtractOptions, ExtractionParameters, LopdfBackend, PageSelection, PdfBackend,
};
pub use pipeline::{InputFile, Pipeline, ScannedPath};
pub use render::JsonFormat;
pub use session::Session;

use std::path::Path;

/// Open a PDF from bytes.
///
/// # Example
///
/// ```no_run
/// use pdftriage::{open_bytes, PdfBackend};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let doc = open_bytes(&data).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open_bytes(data: &[u8]) -> Result<LopdfBackend> {
    detect_format_from_bytes(data)?;
    LopdfBackend::load_bytes(data)
}

/// Open a PDF file.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<LopdfBackend> {
    let data = std::fs::read(path)?;
    open_bytes(&data)
}

/// Classify a PDF given as bytes.
pub fn classify_bytes(data: &[u8]) -> Result<Classification> {
    let doc = open_bytes(data)?;
    Ok(classify(&doc))
}

/// Extract all digital text from a PDF given as bytes.
///
/// The document is opened for this call only.
pub fn extract_digital_bytes(data: &[u8], options: &ExtractOptions) -> Result<Vec<PageResult>> {
    let doc = open_bytes(data)?;
    Ok(extract_digital(&doc, options))
}

/// Extract one page from a PDF given as bytes.
///
/// Re-opens the document on every call; use [`Session`] when the same
/// document is extracted repeatedly. Returns `Ok(None)` for out-of-range
/// pages and pages without text.
///
/// # Example
///
/// ```no_run
/// use pdftriage::{extract_page_bytes, ExtractionParameters};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// match extract_page_bytes(&data, 1, &ExtractionParameters::default()).unwrap() {
///     Some(text) => println!("{}", text),
///     None => println!("No text found on page 1."),
/// }
/// ```
pub fn extract_page_bytes(
    data: &[u8],
    page: u32,
    params: &ExtractionParameters,
) -> Result<Option<String>> {
    let doc = open_bytes(data)?;
    Ok(extract_page(&doc, page, params))
}

/// Summarize a PDF given as bytes.
pub fn document_info(data: &[u8]) -> Result<DocumentInfo> {
    let format = detect_format_from_bytes(data)?;
    let doc = LopdfBackend::load_bytes(data)?;
    Ok(DocumentInfo {
        version: format.version,
        page_count: doc.page_count(),
        encrypted: doc.is_encrypted(),
        classification: classify(&doc),
    })
}
