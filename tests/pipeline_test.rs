//! End-to-end pipeline behaviour: digital, OCR and OCR-less paths.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::build_pdf;
use pdftriage::pipeline::{MSG_DIGITAL, MSG_NO_TEXT, MSG_SCANNED_OCR, MSG_SCANNED_SKIP};
use pdftriage::{
    extract_scanned, Classification, Error, ExtractOptions, InputFile, Notice, NoticeLevel,
    OcrConfig, OcrEngine, OcrMyPdf, Pipeline, Result,
};

/// Pretends to OCR by returning a prepared document.
struct FakeOcr {
    output: Vec<u8>,
    calls: Rc<Cell<u32>>,
}

impl OcrEngine for FakeOcr {
    fn name(&self) -> &str {
        "fake"
    }

    fn ocr(&self, _input: &[u8]) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.output.clone())
    }
}

struct BrokenOcr;

impl OcrEngine for BrokenOcr {
    fn name(&self) -> &str {
        "broken"
    }

    fn ocr(&self, _input: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Ocr("input file is corrupt".to_string()))
    }
}

#[test]
fn test_digital_document() {
    let report = Pipeline::new().process("report.pdf", &common::digital_pdf());

    assert_eq!(report.name, "report.pdf");
    assert_eq!(report.classification, Some(Classification::Digital));
    assert_eq!(report.notices, vec![Notice::info(MSG_DIGITAL)]);
    assert_eq!(report.pages.len(), 3);
}

#[test]
fn test_digital_document_never_calls_ocr() {
    let calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::with_ocr_engine(FakeOcr {
        output: Vec::new(),
        calls: Rc::clone(&calls),
    });
    pipeline.process("report.pdf", &common::digital_pdf());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_scanned_document_is_ocred() {
    let calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::with_ocr_engine(FakeOcr {
        output: build_pdf(&[Some("Recognized text"), Some("More text")]),
        calls: Rc::clone(&calls),
    });

    let report = pipeline.process("scan.pdf", &common::scanned_pdf());

    assert_eq!(calls.get(), 1);
    assert_eq!(report.classification, Some(Classification::Scanned));
    assert_eq!(report.notices, vec![Notice::info(MSG_SCANNED_OCR)]);
    let numbers: Vec<u32> = report.pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert!(report.pages[0].text.contains("Recognized"));
}

#[test]
fn test_ocr_failure_becomes_error_notice() {
    let report = Pipeline::with_ocr_engine(BrokenOcr).process("scan.pdf", &common::scanned_pdf());

    assert!(report.pages.is_empty());
    assert!(report.has_errors());
    let error = report
        .notices
        .iter()
        .find(|n| n.level == NoticeLevel::Error)
        .unwrap();
    assert_eq!(
        error.message,
        "Error running OCR: OCR failed: input file is corrupt"
    );
    assert_eq!(report.notices.last(), Some(&Notice::warning(MSG_NO_TEXT)));
}

#[test]
fn test_extract_scanned_returns_error() {
    let result = extract_scanned(&common::scanned_pdf(), &ExtractOptions::default(), &BrokenOcr);
    assert!(matches!(result, Err(Error::Ocr(_))));
}

#[test]
fn test_ocr_output_that_is_not_a_pdf() {
    let calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::with_ocr_engine(FakeOcr {
        output: b"%PDF-1.4\ntruncated".to_vec(),
        calls,
    });
    let report = pipeline.process("scan.pdf", &common::scanned_pdf());

    assert!(report.pages.is_empty());
    assert!(report.has_errors());
}

#[test]
fn test_ocr_output_without_pdf_header() {
    let calls = Rc::new(Cell::new(0));
    let pipeline = Pipeline::with_ocr_engine(FakeOcr {
        output: b"<html>gateway timeout</html>".to_vec(),
        calls: Rc::clone(&calls),
    });
    let report = pipeline.process("scan.pdf", &common::scanned_pdf());

    assert_eq!(calls.get(), 1);
    assert!(report.pages.is_empty());
    assert!(report
        .notices
        .contains(&Notice::error("Could not read OCR output for scan.pdf: Not a PDF file")));
}

#[test]
fn test_missing_ocr_program_is_reported() {
    let engine = OcrMyPdf::new(OcrConfig::new().with_program("pdftriage-missing-ocrmypdf"));
    let report = Pipeline::with_ocr_engine(engine).process("scan.pdf", &common::scanned_pdf());

    assert!(report.pages.is_empty());
    assert!(report
        .notices
        .iter()
        .any(|n| n.message.starts_with("Error running OCR: OCR engine unavailable")));
}

#[test]
fn test_ocr_less_mode_yields_no_pages() {
    let pipeline = Pipeline::without_ocr();

    for data in [
        common::scanned_pdf(),
        build_pdf(&[Some("Only the first page has text"), None]),
    ] {
        let report = pipeline.process("scan.pdf", &data);
        assert_eq!(report.classification, Some(Classification::Scanned));
        assert!(report.pages.is_empty());
        assert_eq!(
            report.notices,
            vec![Notice::info(MSG_SCANNED_SKIP), Notice::warning(MSG_NO_TEXT)]
        );
    }
}

#[test]
fn test_zero_page_document_warns() {
    let report = Pipeline::without_ocr().process("empty.pdf", &build_pdf(&[]));
    assert_eq!(report.classification, Some(Classification::Digital));
    assert_eq!(
        report.notices,
        vec![Notice::info(MSG_DIGITAL), Notice::warning(MSG_NO_TEXT)]
    );
}

#[test]
fn test_batch_keeps_order_and_isolates_failures() {
    let files = vec![
        InputFile::new("a.pdf", common::digital_pdf()),
        InputFile::new("b.txt", b"plain text".to_vec()),
        InputFile::new("c.pdf", common::scanned_pdf()),
    ];
    let batch = Pipeline::without_ocr().process_batch(&files);

    let names: Vec<&str> = batch.documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.txt", "c.pdf"]);
    assert_eq!(batch.documents[0].pages.len(), 3);
    assert!(batch.documents[1].has_errors());
    assert!(batch.documents[2].pages.is_empty());
    assert!(batch.notices.is_empty());
}

#[test]
fn test_empty_batch_prompts_for_files() {
    let batch = Pipeline::new().process_batch(&[]);
    assert!(batch.documents.is_empty());
    assert_eq!(batch.notices.len(), 1);
    assert_eq!(batch.notices[0].level, NoticeLevel::Info);
}
