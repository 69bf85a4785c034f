//! Cached-parse sessions for interactive use.
//!
//! A [`Session`] parses a document once and keeps every page's glyphs, so
//! changing the layout parameters only re-runs the layout pass.

use log::debug;

use crate::classify::classify_outcomes;
use crate::error::Result;
use crate::extract::collect_pages;
use crate::model::{Classification, PageExtractionOutcome, PageResult};
use crate::parser::{ExtractOptions, ExtractionParameters, PageChars, PdfBackend};

/// A parsed document held in memory.
#[derive(Debug, Clone)]
pub struct Session {
    /// Glyphs per page, or the reason the page could not be read
    pages: Vec<std::result::Result<PageChars, String>>,
    classification: Classification,
}

impl Session {
    /// Check the header, then parse a document from bytes.
    pub fn open(data: &[u8]) -> Result<Self> {
        let doc = crate::open_bytes(data)?;
        Ok(Self::from_backend(&doc))
    }

    /// Read every page of an opened document.
    pub fn from_backend<B: PdfBackend + ?Sized>(doc: &B) -> Self {
        let pages: Vec<_> = (1..=doc.page_count())
            .map(|page| doc.page_chars(page).map_err(|e| e.to_string()))
            .collect();
        debug!("Session cached {} pages", pages.len());

        let classification = classify_outcomes(pages.iter().map(|page| match page {
            Ok(chars) => PageExtractionOutcome::from_text(chars.raw_text()),
            Err(reason) => PageExtractionOutcome::Failed(reason.clone()),
        }));

        Self {
            pages,
            classification,
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Classification computed at open time.
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Layout pass over one cached page. Out-of-range pages are `Failed`.
    pub fn outcome(&self, page: u32, params: &ExtractionParameters) -> PageExtractionOutcome {
        match self.cached(page) {
            Some(Ok(chars)) => PageExtractionOutcome::from_text(chars.layout_text(params)),
            Some(Err(reason)) => PageExtractionOutcome::Failed(reason.clone()),
            None => PageExtractionOutcome::Failed(format!("page {} does not exist", page)),
        }
    }

    /// Text of one page, or `None` when out of range or empty.
    pub fn extract_page(&self, page: u32, params: &ExtractionParameters) -> Option<String> {
        self.cached(page)?;
        self.outcome(page, params).into_text()
    }

    /// Text of the selected pages, omitting pages without text.
    pub fn extract_all(&self, options: &ExtractOptions) -> Vec<PageResult> {
        collect_pages(
            options
                .pages
                .iter_pages(self.page_count())
                .map(|page| (page, self.outcome(page, &options.params))),
        )
    }

    fn cached(&self, page: u32) -> Option<&std::result::Result<PageChars, String>> {
        let index = usize::try_from(page).ok()?.checked_sub(1)?;
        self.pages.get(index)
    }
}
