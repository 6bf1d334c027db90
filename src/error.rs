//! Error types for the PDF plagiarism server

use thiserror::Error;

/// Result type alias for the PDF plagiarism server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF plagiarism server
#[derive(Error, Debug)]
pub enum Error {
    /// Content is not a parseable PDF document
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF parsed but yielded no text lines
    #[error("No text content found in PDF")]
    NoTextContent,

    /// TF-IDF vectorization produced no terms
    #[error("Empty vocabulary: documents contain only stop words or no tokens")]
    EmptyVocabulary,

    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// PDF is password protected and no password was provided
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Uploaded document exceeds the configured size limit
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    /// Cache key not found
    #[error("Cache key not found: {key}")]
    CacheKeyNotFound { key: String },

    /// Path access denied (outside allowed resource directories)
    #[error("Path access denied: {path}")]
    PathAccessDenied { path: String },

    /// Corpus file could not be interpreted
    #[error("Invalid corpus file {path}: {reason}")]
    InvalidCorpus { path: String, reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Background task panicked or was cancelled
    #[error("Task join error: {reason}")]
    TaskJoin { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Glob pattern error
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for structural input failures that must not be folded into a
    /// plagiarism result.
    pub fn is_invalid_document(&self) -> bool {
        matches!(self, Error::InvalidPdf { .. })
    }

    /// Return a sanitized error message safe to send to clients.
    /// Internal details (paths, library errors) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidPdf { reason } => format!("Invalid PDF file: {}", reason),
            Error::NoTextContent => "No text content found in PDF".to_string(),
            Error::EmptyVocabulary => "Text could not be vectorized".to_string(),
            Error::PdfNotFound { .. } => "PDF not found".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::FileTooLarge { max_size, .. } => {
                format!("File exceeds maximum size of {} bytes", max_size)
            }
            Error::CacheKeyNotFound { .. } => "Cache key not found".to_string(),
            Error::PathAccessDenied { .. } => "Access denied".to_string(),
            Error::InvalidCorpus { .. } => "Invalid corpus file".to_string(),
            Error::Config { key, .. } => format!("Invalid configuration for {}", key),
            Error::Pdfium { .. } => "PDF processing error".to_string(),
            Error::TaskJoin { .. } => "Plagiarism check was interrupted".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Glob(_) => "Invalid corpus pattern".to_string(),
            Error::Io(_) => "I/O error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_message() {
        let err = Error::InvalidPdf {
            reason: "File does not start with PDF header".to_string(),
        };
        assert!(err.to_string().starts_with("Invalid PDF file"));
        assert!(err.client_message().contains("Invalid PDF file"));
        assert!(err.is_invalid_document());
    }

    #[test]
    fn test_soft_errors_are_not_invalid_document() {
        assert!(!Error::NoTextContent.is_invalid_document());
        assert!(!Error::EmptyVocabulary.is_invalid_document());
        assert!(!Error::Pdfium {
            reason: "bind failed".to_string()
        }
        .is_invalid_document());
    }

    #[test]
    fn test_client_message_hides_paths() {
        let err = Error::PathAccessDenied {
            path: "/etc/passwd".to_string(),
        };
        assert!(!err.client_message().contains("/etc"));
    }
}
