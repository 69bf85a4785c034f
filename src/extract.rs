//! Layout-aware text extraction.
//!
//! Digital documents are read directly. Scanned documents go through an
//! [`OcrEngine`] first and are then read the same way.

use log::{debug, info};

use crate::error::Result;
use crate::model::{PageExtractionOutcome, PageResult};
use crate::ocr::OcrEngine;
use crate::parser::{ExtractOptions, ExtractionParameters, PdfBackend};

/// Run the layout-aware pass over one page.
pub fn layout_outcome<B: PdfBackend + ?Sized>(
    doc: &B,
    page: u32,
    params: &ExtractionParameters,
) -> PageExtractionOutcome {
    PageExtractionOutcome::from_result(doc.page_chars(page).map(|chars| chars.layout_text(params)))
}

/// Collect text for the selected pages, omitting pages without text.
///
/// Pages are processed in ascending order, one at a time.
pub fn extract_digital<B: PdfBackend + ?Sized>(doc: &B, options: &ExtractOptions) -> Vec<PageResult> {
    collect_pages(
        options
            .pages
            .iter_pages(doc.page_count())
            .map(|page| (page, layout_outcome(doc, page, &options.params))),
    )
}

/// Reduce `(page, outcome)` pairs to page results.
pub(crate) fn collect_pages<I>(outcomes: I) -> Vec<PageResult>
where
    I: IntoIterator<Item = (u32, PageExtractionOutcome)>,
{
    outcomes
        .into_iter()
        .filter_map(|(page, outcome)| match outcome {
            PageExtractionOutcome::Text(text) => Some(PageResult::new(page, text)),
            PageExtractionOutcome::Empty => {
                debug!("Page {}: no text", page);
                None
            }
            PageExtractionOutcome::Failed(reason) => {
                debug!("Page {}: extraction failed: {}", page, reason);
                None
            }
        })
        .collect()
}

/// Extract a single page.
///
/// Returns `None` when `page` is outside `1..=page_count` or the page has
/// no text.
pub fn extract_page<B: PdfBackend + ?Sized>(
    doc: &B,
    page: u32,
    params: &ExtractionParameters,
) -> Option<String> {
    if page < 1 || page > doc.page_count() {
        return None;
    }
    layout_outcome(doc, page, params).into_text()
}

/// OCR the whole document, then extract the derived document.
///
/// The engine's output must carry a PDF header. Any failure of the OCR
/// engine or of opening its output is returned as an error; callers decide
/// how to present it.
pub fn extract_scanned(
    data: &[u8],
    options: &ExtractOptions,
    engine: &dyn OcrEngine,
) -> Result<Vec<PageResult>> {
    info!("Running OCR with {}", engine.name());
    let ocr_output = engine.ocr(data)?;
    let doc = crate::open_bytes(&ocr_output)?;
    Ok(extract_digital(&doc, options))
}
