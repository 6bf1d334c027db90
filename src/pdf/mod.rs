//! PDF text extraction
//!
//! The plagiarism core only sees lines of text; [`TextExtractor`] is the seam
//! between it and whatever reads the document. [`PdfiumExtractor`] is the
//! production implementation.

mod reader;

pub use reader::{assemble_lines, has_pdf_signature, PdfiumExtractor, PositionedChar};

use crate::error::Result;

/// Turns document bytes into text lines in reading order
pub trait TextExtractor {
    /// Extract every line of every page.
    ///
    /// Content that is not a readable PDF must fail with
    /// [`Error::InvalidPdf`](crate::error::Error::InvalidPdf).
    fn extract_lines(&self, data: &[u8]) -> Result<Vec<String>>;
}
