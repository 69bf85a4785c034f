//! Cached sessions behave like the re-opening byte-level functions.

mod common;

use common::build_pdf;
use pdftriage::{
    extract_digital_bytes, extract_page_bytes, render, Classification, Error, ExtractOptions,
    ExtractionParameters, PageSelection, Session,
};

#[test]
fn test_session_matches_reopening() {
    let data = build_pdf(&[Some("Alpha beta\ngamma"), None, Some("Delta")]);
    let session = Session::open(&data).unwrap();

    for params in [
        ExtractionParameters::default(),
        ExtractionParameters::default().with_x_density(2.5),
        ExtractionParameters::default()
            .with_y_density(30.0)
            .with_x_tolerance(0.5),
    ] {
        for page in 0..=4 {
            assert_eq!(
                session.extract_page(page, &params),
                extract_page_bytes(&data, page, &params).unwrap(),
                "page {} with {:?}",
                page,
                params
            );
        }

        let options = ExtractOptions::new().with_params(params);
        assert_eq!(
            session.extract_all(&options),
            extract_digital_bytes(&data, &options).unwrap()
        );
    }
}

#[test]
fn test_session_classification() {
    let digital = Session::open(&common::digital_pdf()).unwrap();
    assert_eq!(digital.classification(), Classification::Digital);
    assert_eq!(digital.page_count(), 3);

    let scanned = Session::open(&common::scanned_pdf()).unwrap();
    assert_eq!(scanned.classification(), Classification::Scanned);
}

#[test]
fn test_session_page_selection() {
    let session = Session::open(&common::digital_pdf()).unwrap();
    let options = ExtractOptions::new().with_pages(PageSelection::pages([1, 3]));
    let numbers: Vec<u32> = session
        .extract_all(&options)
        .iter()
        .map(|p| p.number)
        .collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[test]
fn test_render_missing_page() {
    let session = Session::open(&common::scanned_pdf()).unwrap();
    let text = session.extract_page(1, &ExtractionParameters::default());
    assert_eq!(
        render::render_page(1, text.as_deref()),
        "No text found on page 1.\n"
    );
}

#[test]
fn test_open_invalid_bytes_fails() {
    assert!(Session::open(b"%PDF-1.7\ngarbage").is_err());
}

#[test]
fn test_open_rejects_non_pdf() {
    assert!(matches!(
        Session::open(b"PK\x03\x04 zip archive"),
        Err(Error::UnknownFormat)
    ));
}
