//! PDF parsing module.

mod backend;
mod content;
mod layout;
mod options;

pub use backend::{LopdfBackend, PdfBackend};
pub use content::{decode_text_simple, GlyphWalker, Matrix};
pub use layout::{
    cluster_lines, extract_words, layout_text, simple_text, PageChars, TextChar, TextLine, Word,
    RAW_TOLERANCE,
};
pub use options::{ExtractOptions, ExtractionParameters, PageSelection};
