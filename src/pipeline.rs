//! Per-document processing pipeline.
//!
//! The pipeline validates the header, classifies the document and then
//! takes the digital path, the OCR path or the skip path. Nothing that goes
//! wrong with a single document escapes as an error: failures become
//! [`Notice`]s on its [`DocumentReport`].

use log::{info, warn};

use crate::classify::classify;
use crate::detect::detect_format_from_bytes;
use crate::extract::{extract_digital, extract_scanned};
use crate::model::{BatchReport, Classification, DocumentReport, Notice};
use crate::ocr::{OcrEngine, OcrMyPdf};
use crate::parser::{ExtractOptions, ExtractionParameters, LopdfBackend, PageSelection, PdfBackend};

/// Shown while a scanned document is handed to OCR.
pub const MSG_SCANNED_OCR: &str = "Detected a scanned PDF. Performing OCR...";
/// Shown for scanned documents when OCR is disabled.
pub const MSG_SCANNED_SKIP: &str =
    "Detected a scanned PDF. OCR is disabled, skipping text extraction.";
/// Shown before direct extraction.
pub const MSG_DIGITAL: &str = "Extracting text from digital PDF...";
/// Shown when a document produced no pages.
pub const MSG_NO_TEXT: &str = "No text could be extracted from this file.";
/// Shown for an empty batch.
pub const MSG_UPLOAD_PROMPT: &str = "Please upload PDF files to start the extraction process.";

/// What happens to documents classified as scanned.
pub enum ScannedPath {
    /// OCR the document, then extract it
    Ocr(Box<dyn OcrEngine>),
    /// Produce no pages
    Skip,
}

impl std::fmt::Debug for ScannedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScannedPath::Ocr(engine) => f.debug_tuple("Ocr").field(&engine.name()).finish(),
            ScannedPath::Skip => f.write_str("Skip"),
        }
    }
}

/// A named input document.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl InputFile {
    /// Create an input from a name and its bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Classification plus extraction, configured once and run per document.
#[derive(Debug)]
pub struct Pipeline {
    options: ExtractOptions,
    scanned: ScannedPath,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline using `ocrmypdf` with default settings.
    pub fn new() -> Self {
        Self::with_ocr_engine(OcrMyPdf::default())
    }

    /// Pipeline that skips scanned documents.
    pub fn without_ocr() -> Self {
        Self {
            options: ExtractOptions::default(),
            scanned: ScannedPath::Skip,
        }
    }

    /// Pipeline using the given OCR engine.
    pub fn with_ocr_engine<E: OcrEngine + 'static>(engine: E) -> Self {
        Self {
            options: ExtractOptions::default(),
            scanned: ScannedPath::Ocr(Box::new(engine)),
        }
    }

    /// Set extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Set layout parameters.
    pub fn with_params(mut self, params: ExtractionParameters) -> Self {
        self.options.params = params;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.pages = pages;
        self
    }

    /// Current extraction options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Check if scanned documents are sent to OCR.
    pub fn ocr_enabled(&self) -> bool {
        matches!(self.scanned, ScannedPath::Ocr(_))
    }

    /// Process one document.
    pub fn process(&self, name: &str, data: &[u8]) -> DocumentReport {
        let mut report = DocumentReport::new(name);

        if let Err(e) = detect_format_from_bytes(data) {
            warn!("{}: {}", name, e);
            report.push_notice(Notice::error(format!("{}: {}", name, e)));
            return report;
        }

        let doc = match LopdfBackend::load_bytes(data) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("{}: {}", name, e);
                report.push_notice(Notice::error(format!("Could not open {}: {}", name, e)));
                return report;
            }
        };

        let classification = classify(&doc);
        info!("{}: {} document, {} pages", name, classification, doc.page_count());
        report.classification = Some(classification);

        match (classification, &self.scanned) {
            (Classification::Digital, _) => {
                report.push_notice(Notice::info(MSG_DIGITAL));
                report.pages = extract_digital(&doc, &self.options);
            }
            (Classification::Scanned, ScannedPath::Ocr(engine)) => {
                report.push_notice(Notice::info(MSG_SCANNED_OCR));
                drop(doc);
                match extract_scanned(data, &self.options, &**engine) {
                    Ok(pages) => report.pages = pages,
                    Err(e) if e.is_ocr() => {
                        warn!("{}: OCR failed: {}", name, e);
                        report.push_notice(Notice::error(format!("Error running OCR: {}", e)));
                    }
                    Err(e) => {
                        warn!("{}: unreadable OCR output: {}", name, e);
                        report.push_notice(Notice::error(format!(
                            "Could not read OCR output for {}: {}",
                            name, e
                        )));
                    }
                }
            }
            (Classification::Scanned, ScannedPath::Skip) => {
                report.push_notice(Notice::info(MSG_SCANNED_SKIP));
            }
        }

        if report.pages.is_empty() {
            report.push_notice(Notice::warning(MSG_NO_TEXT));
        }
        report
    }

    /// Process every file in order.
    pub fn process_batch(&self, files: &[InputFile]) -> BatchReport {
        let mut batch = BatchReport::default();
        if files.is_empty() {
            batch.notices.push(Notice::info(MSG_UPLOAD_PROMPT));
            return batch;
        }

        batch.documents = files
            .iter()
            .map(|file| self.process(&file.name, &file.data))
            .collect();
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoticeLevel;

    #[test]
    fn test_empty_batch_prompts() {
        let batch = Pipeline::without_ocr().process_batch(&[]);
        assert!(batch.documents.is_empty());
        assert_eq!(batch.notices, vec![Notice::info(MSG_UPLOAD_PROMPT)]);
    }

    #[test]
    fn test_non_pdf_is_error_notice() {
        let report = Pipeline::without_ocr().process("notes.txt", b"just some text");
        assert!(report.pages.is_empty());
        assert_eq!(report.classification, None);
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].level, NoticeLevel::Error);
        assert!(report.notices[0].message.starts_with("notes.txt: "));
    }

    #[test]
    fn test_broken_pdf_is_error_notice() {
        let report = Pipeline::without_ocr().process("broken.pdf", b"%PDF-1.4\nnot really");
        assert!(report.has_errors());
        assert!(report.notices[0].message.starts_with("Could not open broken.pdf"));
    }

    #[test]
    fn test_builders() {
        let pipeline = Pipeline::without_ocr()
            .with_params(ExtractionParameters::default().with_x_density(8.0))
            .with_pages(PageSelection::Range(1..=2));
        assert!(!pipeline.ocr_enabled());
        assert_eq!(pipeline.options().params.x_density, 8.0);
        assert_eq!(pipeline.options().pages, PageSelection::Range(1..=2));
        assert!(Pipeline::new().ocr_enabled());
    }
}
