//! Result types shared by the classifier, extractors and renderers.

mod document;
mod page;

pub use document::{
    BatchReport, Classification, DocumentInfo, DocumentReport, Notice, NoticeLevel,
};
pub use page::{PageExtractionOutcome, PageResult};
