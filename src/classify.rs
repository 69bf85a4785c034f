//! Scanned-versus-digital classification.
//!
//! A document is digital when every page yields text under the raw
//! (parameter-free) pass. The first page that is empty or unreadable makes
//! it scanned; later pages are never looked at.

use log::debug;

use crate::model::{Classification, PageExtractionOutcome};
use crate::parser::PdfBackend;

/// Run the raw text pass over one page.
pub fn raw_outcome<B: PdfBackend + ?Sized>(doc: &B, page: u32) -> PageExtractionOutcome {
    PageExtractionOutcome::from_result(doc.page_chars(page).map(|chars| chars.raw_text()))
}

/// Reduce page outcomes to a classification, stopping at the first page
/// without text.
///
/// An empty sequence is `Digital`. Zero-page documents therefore classify
/// as digital even though there is nothing to read.
pub fn classify_outcomes<I>(outcomes: I) -> Classification
where
    I: IntoIterator<Item = PageExtractionOutcome>,
{
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            PageExtractionOutcome::Text(_) => continue,
            PageExtractionOutcome::Empty => {
                debug!("Page {} has no text, treating document as scanned", index + 1);
                return Classification::Scanned;
            }
            PageExtractionOutcome::Failed(reason) => {
                debug!(
                    "Page {} failed to extract ({}), treating document as scanned",
                    index + 1,
                    reason
                );
                return Classification::Scanned;
            }
        }
    }
    Classification::Digital
}

/// Classify an opened document.
pub fn classify<B: PdfBackend + ?Sized>(doc: &B) -> Classification {
    classify_outcomes((1..=doc.page_count()).map(|page| raw_outcome(doc, page)))
}
