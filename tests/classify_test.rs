//! Classification of real PDF documents.

mod common;

use common::build_pdf;
use pdftriage::{classify, classify_bytes, document_info, open_bytes, Classification, Error};

#[test]
fn test_all_text_pages_are_digital() {
    let data = common::digital_pdf();
    assert_eq!(classify_bytes(&data).unwrap(), Classification::Digital);
}

#[test]
fn test_image_only_pages_are_scanned() {
    let data = common::scanned_pdf();
    assert_eq!(classify_bytes(&data).unwrap(), Classification::Scanned);
}

#[test]
fn test_single_empty_page_makes_document_scanned() {
    let data = build_pdf(&[Some("Cover"), Some("Body"), None, Some("Appendix")]);
    assert_eq!(classify_bytes(&data).unwrap(), Classification::Scanned);
}

#[test]
fn test_whitespace_only_page_is_scanned() {
    let data = build_pdf(&[Some("Cover"), Some("     ")]);
    assert_eq!(classify_bytes(&data).unwrap(), Classification::Scanned);
}

#[test]
fn test_zero_page_document_is_digital() {
    // Known gap: an empty document has nothing to contradict "digital".
    let data = build_pdf(&[]);
    let doc = open_bytes(&data).unwrap();
    assert_eq!(pdftriage::PdfBackend::page_count(&doc), 0);
    assert_eq!(classify(&doc), Classification::Digital);
}

#[test]
fn test_non_pdf_input_is_rejected() {
    assert!(matches!(
        classify_bytes(b"GIF89a...."),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn test_document_info() {
    let info = document_info(&common::digital_pdf()).unwrap();
    assert_eq!(info.version, "1.5");
    assert_eq!(info.page_count, 3);
    assert!(!info.encrypted);
    assert_eq!(info.classification, Classification::Digital);
}
