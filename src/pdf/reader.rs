//! PDFium-backed text extraction

use super::TextExtractor;
use crate::error::{Error, Result};
use pdfium_render::prelude::*;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// A glyph with its page position, in PDF points
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedChar {
    pub ch: char,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// True when `data` starts with the `%PDF-` header
pub fn has_pdf_signature(data: &[u8]) -> bool {
    data.starts_with(PDF_SIGNATURE)
}

/// Extracts text with PDFium, one entry per visual line
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    password: Option<String>,
}

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: Option<String>) -> Self {
        Self { password }
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract_lines(&self, data: &[u8]) -> Result<Vec<String>> {
        if !has_pdf_signature(data) {
            return Err(Error::InvalidPdf {
                reason: "File does not start with PDF header".to_string(),
            });
        }

        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, self.password.as_deref())
            .map_err(map_load_error)?;

        let pages = document.pages();
        let mut lines = Vec::new();

        for index in 0..pages.len() {
            let page = pages.get(index).map_err(|e| Error::InvalidPdf {
                reason: format!("Failed to read page {}: {}", index + 1, e),
            })?;
            lines.extend(page_lines(usize::from(index) + 1, page_chars(&page)));
        }

        tracing::debug!(pages = pages.len(), lines = lines.len(), "extracted pdf text");
        Ok(lines)
    }
}

/// Bind PDFium (a new instance per call; PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// A document PDFium refuses to open is structurally invalid, unless it only
/// lacks a password.
fn map_load_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::PasswordRequired
        }
        _ => Error::InvalidPdf {
            reason: err.to_string(),
        },
    }
}

fn page_chars(page: &PdfPage) -> std::result::Result<Vec<PositionedChar>, PdfiumError> {
    let text = page.text()?;

    let mut chars = Vec::new();
    for segment in text.segments().iter() {
        if let Ok(segment_chars) = segment.chars() {
            for char_result in segment_chars.iter() {
                let bounds = char_result.loose_bounds();
                if let (Some(ch), Ok(bounds)) = (char_result.unicode_char(), bounds) {
                    chars.push(PositionedChar {
                        ch,
                        x: bounds.left().value,
                        y: bounds.top().value,
                        width: bounds.width().value,
                        height: bounds.height().value,
                    });
                }
            }
        }
    }
    Ok(chars)
}

/// Lines of one page. A page whose text layer cannot be read contributes none.
fn page_lines<E: std::fmt::Display>(
    page_number: usize,
    chars: std::result::Result<Vec<PositionedChar>, E>,
) -> Vec<String> {
    match chars {
        Ok(chars) => assemble_lines(chars),
        Err(e) => {
            tracing::warn!(page = page_number, error = %e, "skipping page without readable text");
            Vec::new()
        }
    }
}

/// Group glyphs into lines, top to bottom, left to right.
///
/// Glyphs whose tops are within ~40% of the median glyph height share a line;
/// a horizontal gap wider than ~30% of it becomes a space. Blank lines are
/// dropped and every line is trimmed.
pub fn assemble_lines(mut chars: Vec<PositionedChar>) -> Vec<String> {
    if chars.is_empty() {
        return Vec::new();
    }

    let (y_tolerance, space_gap) = layout_tolerances(&chars);

    // PDF y grows upwards: top of page first
    chars.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<PositionedChar>> = Vec::new();
    let mut row_y: Option<f32> = None;
    for c in chars {
        if matches!(row_y, Some(y) if (y - c.y).abs() <= y_tolerance) {
            if let Some(row) = rows.last_mut() {
                row.push(c);
                continue;
            }
        }
        row_y = Some(c.y);
        rows.push(vec![c]);
    }

    rows.into_iter()
        .filter_map(|mut row| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            let line = render_row(&row, space_gap);
            let trimmed = line.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

fn render_row(row: &[PositionedChar], space_gap: f32) -> String {
    let mut line = String::with_capacity(row.len());
    let mut prev_right: Option<f32> = None;

    for c in row {
        if let Some(right) = prev_right {
            if c.x - right > space_gap && !c.ch.is_whitespace() && !line.ends_with(' ') {
                line.push(' ');
            }
        }
        line.push(c.ch);
        prev_right = Some(c.x + c.width);
    }
    line
}

/// (same-line tolerance, word gap) derived from the median glyph height
fn layout_tolerances(chars: &[PositionedChar]) -> (f32, f32) {
    let mut heights: Vec<f32> = chars.iter().map(|c| c.height).filter(|&h| h > 0.0).collect();
    if heights.is_empty() {
        return (5.0, 3.0);
    }

    heights.sort_by(f32::total_cmp);
    let median = heights[heights.len() / 2];
    ((median * 0.4).max(2.0), (median * 0.3).max(1.0))
}
