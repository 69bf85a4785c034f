//! PDF header detection.
//!
//! Uploaded files and OCR output are checked here before anything tries to
//! parse them, so a stray image or HTML error page turns into a clean
//! [`Error::UnknownFormat`] instead of a parser failure deep in lopdf.

use crate::error::{Error, Result};

const HEADER: &[u8] = b"%PDF-";

/// Readers tolerate junk before the header; so do we, up to this offset.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Version declared in a PDF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Version string as written, e.g. "1.7"
    pub version: String,
    /// Byte offset of `%PDF-` in the input
    pub offset: usize,
}

impl PdfFormat {
    /// Major and minor version numbers.
    pub fn version_numbers(&self) -> (u8, u8) {
        let bytes = self.version.as_bytes();
        (bytes[0] - b'0', bytes[2] - b'0')
    }
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Locate the `%PDF-x.y` header and read its version.
///
/// The header may be preceded by up to 1 KiB of other bytes.
///
/// # Example
/// ```
/// use pdftriage::detect_format_from_bytes;
///
/// let format = detect_format_from_bytes(b"%PDF-1.7\n").unwrap();
/// assert_eq!(format.version, "1.7");
/// assert!(detect_format_from_bytes(b"<html>").is_err());
/// ```
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW + HEADER.len())];
    let offset = window
        .windows(HEADER.len())
        .position(|w| w == HEADER)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + HEADER.len();
    let version = match data.get(start..start + 3) {
        Some([major, b'.', minor]) if major.is_ascii_digit() && minor.is_ascii_digit() => {
            format!("{}.{}", *major as char, *minor as char)
        }
        Some(other) => {
            return Err(Error::UnsupportedVersion(
                String::from_utf8_lossy(other).into_owned(),
            ))
        }
        None => return Err(Error::UnknownFormat),
    };

    Ok(PdfFormat { version, offset })
}

/// Check if bytes carry a usable PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
