//! Plagiarism detection core
//!
//! Candidate lines extracted from a document are compared with every entry of
//! a [`Corpus`] of known sources; accepted matches are deduplicated per line
//! and ranked by score.
//!
//! The core is synchronous and never mutates the corpus it is given, so any
//! number of checks may share one snapshot.

pub mod aggregate;
pub mod compare;
pub mod corpus;
pub mod engine;
pub mod normalize;
pub mod similarity;
pub mod tfidf;
pub mod threshold;

pub use aggregate::aggregate;
pub use compare::{compare_documents, DocumentComparison};
pub use corpus::{Corpus, SourceSummary};
pub use engine::find_matches;
pub use normalize::{normalize, normalize_document};
pub use similarity::similarity;
pub use threshold::threshold_for;

use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::pdf::TextExtractor;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A reference fragment in the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnownSource {
    pub text: String,
    /// Label of the work this fragment comes from
    pub source: String,
    /// 1-indexed line within the source
    pub line_number: u32,
}

/// One non-empty line of the document under check
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLine {
    pub text: String,
    /// 1-indexed among the non-empty lines of the document
    pub line_number: u32,
}

/// A candidate line accepted as matching a known source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlagiarismMatch {
    /// Candidate line as extracted
    pub text: String,
    /// Label of the matched source
    pub source: String,
    pub line_number: u32,
    pub source_line_number: u32,
    /// In `[0, 1]`, at least the threshold that accepted the match
    pub similarity_score: f64,
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlagiarismResult {
    pub plagiarized: bool,
    /// Descending by `similarity_score`, at most one per `line_number`
    pub matches: Vec<PlagiarismMatch>,
    pub error: Option<String>,
}

impl PlagiarismResult {
    /// The check could not be completed
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            plagiarized: false,
            matches: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Number the non-empty lines of extracted text, trimming each
pub fn candidate_lines<I, S>(raw_lines: I) -> Vec<CandidateLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_lines
        .into_iter()
        .filter_map(|line| {
            let trimmed = line.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .zip(1u32..)
        .map(|(text, line_number)| CandidateLine { text, line_number })
        .collect()
}

/// Check already-split lines against a corpus snapshot
pub fn check_lines(
    lines: &[CandidateLine],
    corpus: &Corpus,
    config: &DetectionConfig,
) -> PlagiarismResult {
    let result = aggregate(find_matches(lines, corpus.as_slice(), config));
    tracing::debug!(
        lines = lines.len(),
        sources = corpus.len(),
        matches = result.matches.len(),
        mode = ?config.mode,
        "plagiarism check complete"
    );
    result
}

/// Check free text, one candidate per line
pub fn check_text(text: &str, corpus: &Corpus, config: &DetectionConfig) -> PlagiarismResult {
    check_lines(&candidate_lines(text.lines()), corpus, config)
}

/// Extract `data` with `extractor` and check it.
///
/// Content that is not a readable PDF is returned as [`Error::InvalidPdf`].
/// Every other failure, and a document without text, yields a result with
/// `error` set.
pub fn check_document<E>(
    extractor: &E,
    data: &[u8],
    corpus: &Corpus,
    config: &DetectionConfig,
) -> Result<PlagiarismResult>
where
    E: TextExtractor + ?Sized,
{
    let raw_lines = match extractor.extract_lines(data) {
        Ok(lines) => lines,
        Err(e) if e.is_invalid_document() => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "text extraction failed");
            return Ok(PlagiarismResult::failed(e.client_message()));
        }
    };

    let lines = candidate_lines(raw_lines);
    if lines.is_empty() {
        return Ok(PlagiarismResult::failed(Error::NoTextContent.client_message()));
    }

    Ok(check_lines(&lines, corpus, config))
}
