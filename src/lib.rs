//! PDF Plagiarism Server Library
//!
//! This crate checks documents for text copied from a corpus of known sources
//! and exposes the checks as MCP tools:
//! - `check_plagiarism`: Check PDF documents against the corpus
//! - `check_text`: Check plain text against the corpus
//! - `compare_texts`: Compare two texts as whole documents
//! - `add_known_source` / `add_reference_pdf`: Grow the corpus
//! - `list_known_sources` / `remove_known_source`: Inspect and prune the corpus

pub mod config;
pub mod error;
pub mod pdf;
pub mod plagiarism;
pub mod server;
pub mod source;

pub use config::{DetectionConfig, ScoringMode, ServerConfig};
pub use error::{Error, Result};
pub use plagiarism::{
    check_document, check_text, compare_documents, Corpus, KnownSource, PlagiarismMatch,
    PlagiarismResult,
};
pub use server::{run_server, run_server_with_config, DocumentSource, PlagiarismServer};
