//! PDF backend abstraction layer.
//!
//! Classification and extraction only need two things from a document: how
//! many pages it has and the positioned glyphs of each page. [`PdfBackend`]
//! captures exactly that, isolating the concrete PDF library (lopdf) from
//! the decision logic and letting tests substitute synthetic documents.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::content::{get_number, resolve, resolve_dict, stream_content, GlyphWalker, Matrix};
use super::layout::PageChars;
use crate::error::{Error, Result};

/// Letter size, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page tree inheritance is followed at most this many levels up.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Abstract interface for an opened PDF document.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Positioned glyphs of a page (1-indexed).
    ///
    /// Returns [`Error::PageOutOfRange`] for pages outside `1..=page_count`,
    /// and a parse or extraction error when the page content is unreadable.
    fn page_chars(&self, page: u32) -> Result<PageChars>;
}

impl<B: PdfBackend + ?Sized> PdfBackend for &B {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn page_chars(&self, page: u32) -> Result<PageChars> {
        (**self).page_chars(page)
    }
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already parsed lopdf document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Look up a page attribute, following the page tree for inheritable
    /// keys such as `Resources` and `MediaBox`.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(resolve(&self.doc, value));
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// MediaBox as normalized `[left, bottom, right, top]`.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let values: Vec<f32> = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .filter_map(|o| get_number(resolve(&self.doc, o)))
                    .collect()
            })
            .unwrap_or_default();

        match values.as_slice() {
            [x0, y0, x1, y1, ..] => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    /// Concatenated, decompressed content streams of a page. A page without
    /// `Contents` is blank, not broken.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => resolve(&self.doc, contents),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(s) => stream_content(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    match resolve(&self.doc, obj) {
                        Object::Stream(s) => {
                            content.extend_from_slice(&stream_content(s)?);
                            content.push(b'\n');
                        }
                        _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_chars(&self, page: u32) -> Result<PageChars> {
        let page_id = self.page_id(page)?;
        let [left, bottom, right, top] = self.media_box(page_id);
        let resources = self
            .inherited(page_id, b"Resources")
            .and_then(|o| resolve_dict(&self.doc, o));

        let content = self.page_content(page_id)?;
        let mut walker = GlyphWalker::new(&self.doc, left, top);
        walker
            .walk(&content, resources, Matrix::IDENTITY, 0)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))?;

        Ok(PageChars {
            number: page,
            width: right - left,
            height: top - bottom,
            chars: walker.finish(),
        })
    }
}

impl std::fmt::Debug for LopdfBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfBackend")
            .field("version", &self.doc.version)
            .field("pages", &self.pages.len())
            .finish()
    }
}
