//! Shared fixtures for integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Font size used for every fixture line.
pub const FONT_SIZE: i64 = 12;
/// Baseline of the first line.
pub const FIRST_BASELINE: i64 = 720;
/// Distance between baselines.
pub const LEADING: i64 = 14;

/// Content operations drawing `text` one line per `\n`, starting at
/// (72, 720) in Helvetica 12.
fn text_ops(text: &str) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("Td", vec![72.into(), FIRST_BASELINE.into()]),
    ];
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            ops.push(Operation::new("Td", vec![0.into(), (-LEADING).into()]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(line)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Content for an image-only page: a filled rectangle, no text.
fn graphics_ops() -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![0.5.into(), 0.5.into(), 0.5.into()]),
        Operation::new(
            "re",
            vec![72.into(), 72.into(), 468.into(), 648.into()],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// Build a PDF with one page per entry: `Some(text)` draws text,
/// `None` draws only graphics.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => text_ops(text),
            None => graphics_ops(),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save fixture");
    buf
}

/// A three-page digital document.
pub fn digital_pdf() -> Vec<u8> {
    build_pdf(&[
        Some("Quarterly report\nRevenue grew"),
        Some("Second page"),
        Some("Third page"),
    ])
}

/// A document whose pages carry no text at all.
pub fn scanned_pdf() -> Vec<u8> {
    build_pdf(&[None, None])
}
