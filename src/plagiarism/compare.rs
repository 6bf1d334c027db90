//! Whole-document comparison

use super::normalize::normalize;
use super::similarity::similarity;
use super::tfidf::cosine_similarity;
use super::threshold::threshold_for_len;
use rmcp::schemars::JsonSchema;
use serde::Serialize;

/// Scores of two texts compared as wholes
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DocumentComparison {
    /// Character alignment ratio of the raw texts
    pub sequence_similarity: f64,
    /// TF-IDF cosine of the preprocessed texts
    pub tfidf_similarity: f64,
    /// Adaptive threshold for the shorter preprocessed text
    pub threshold: f64,
    /// `tfidf_similarity` reaches `threshold`
    pub similar: bool,
}

pub fn compare_documents(a: &str, b: &str) -> DocumentComparison {
    let processed_a = normalize(a);
    let processed_b = normalize(b);

    let tfidf_similarity = cosine_similarity(&processed_a, &processed_b);
    let shorter = processed_a.chars().count().min(processed_b.chars().count());
    let threshold = threshold_for_len(shorter);

    DocumentComparison {
        sequence_similarity: similarity(a, b),
        tfidf_similarity,
        threshold,
        similar: tfidf_similarity >= threshold,
    }
}
