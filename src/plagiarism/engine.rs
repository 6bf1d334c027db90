//! Line-by-line comparison of a document against known sources
//!
//! In [`ScoringMode::Sequence`] every (line, source) pair goes through two
//! tiers:
//!
//! 1. the line score alone reaches `high_threshold`;
//! 2. the line score is at least `partial_floor` and some pair of
//!    `chunk_words`-word windows, one from each side, reaches
//!    `high_threshold`. The match still reports the line score: chunks only
//!    decide whether the pair is flagged.
//!
//! [`ScoringMode::Tfidf`] instead scores each line by TF-IDF cosine over the
//! [`normalize`]d text, so letters of any script and digits take part in the
//! score. A line is accepted at the length-adaptive [`threshold_for`] bar of
//! that line, not at a fixed cutoff: short lines must reach 0.7 while lines of
//! 500 characters or more need only 0.3.
//!
//! Cost is `lines * sources * chunks^2` in the worst case.

use super::normalize::normalize;
use super::similarity::{fragment_similarity, Fragment};
use super::tfidf::cosine_similarity;
use super::threshold::threshold_for;
use super::{CandidateLine, KnownSource, PlagiarismMatch};
use crate::config::{DetectionConfig, ScoringMode};

/// All accepted (line, source) pairs, unranked and possibly several per line
pub fn find_matches(
    lines: &[CandidateLine],
    corpus: &[KnownSource],
    config: &DetectionConfig,
) -> Vec<PlagiarismMatch> {
    if lines.is_empty() || corpus.is_empty() {
        return Vec::new();
    }

    match config.mode {
        ScoringMode::Sequence => sequence_matches(lines, corpus, config),
        ScoringMode::Tfidf => tfidf_matches(lines, corpus, config),
    }
}

/// A text prepared once for repeated scoring
struct Prepared {
    whole: Fragment,
    chunks: Option<Vec<Fragment>>,
}

impl Prepared {
    fn new(text: &str) -> Self {
        Self {
            whole: Fragment::new(text),
            chunks: None,
        }
    }

    fn chunks(&mut self, text: &str, chunk_words: usize) -> &[Fragment] {
        self.chunks.get_or_insert_with(|| {
            word_chunks(text, chunk_words)
                .iter()
                .map(|c| Fragment::new(c))
                .collect()
        })
    }
}

fn sequence_matches(
    lines: &[CandidateLine],
    corpus: &[KnownSource],
    config: &DetectionConfig,
) -> Vec<PlagiarismMatch> {
    let mut sources: Vec<Prepared> = corpus.iter().map(|s| Prepared::new(&s.text)).collect();
    let mut matches = Vec::new();

    for line in lines {
        let mut candidate = Prepared::new(&line.text);

        for (known, prepared) in corpus.iter().zip(sources.iter_mut()) {
            let score =
                fragment_similarity(&candidate.whole, &prepared.whole, config.min_fragment_len);

            let accepted = if score >= config.high_threshold {
                true
            } else if score > 0.0 && score >= config.partial_floor {
                let line_chunks = candidate.chunks(&line.text, config.chunk_words);
                let source_chunks = prepared.chunks(&known.text, config.chunk_words);
                any_chunk_match(line_chunks, source_chunks, config)
            } else {
                false
            };

            if accepted {
                matches.push(PlagiarismMatch {
                    text: line.text.clone(),
                    source: known.source.clone(),
                    line_number: line.line_number,
                    source_line_number: known.line_number,
                    similarity_score: score,
                });
            }
        }
    }

    matches
}

/// True as soon as one chunk pair reaches the high threshold
fn any_chunk_match(
    line_chunks: &[Fragment],
    source_chunks: &[Fragment],
    config: &DetectionConfig,
) -> bool {
    line_chunks.iter().any(|chunk| {
        source_chunks.iter().any(|source_chunk| {
            fragment_similarity(chunk, source_chunk, config.min_fragment_len)
                >= config.high_threshold
        })
    })
}

fn tfidf_matches(
    lines: &[CandidateLine],
    corpus: &[KnownSource],
    config: &DetectionConfig,
) -> Vec<PlagiarismMatch> {
    let sources: Vec<String> = corpus.iter().map(|s| normalize(&s.text)).collect();
    let mut matches = Vec::new();

    for line in lines {
        let processed = normalize(&line.text);
        if processed.chars().count() < config.min_document_line_len {
            continue;
        }
        let threshold = threshold_for(&processed);

        for (known, source_text) in corpus.iter().zip(&sources) {
            let score = cosine_similarity(&processed, source_text);
            if score >= threshold {
                matches.push(PlagiarismMatch {
                    text: line.text.clone(),
                    source: known.source.clone(),
                    line_number: line.line_number,
                    source_line_number: known.line_number,
                    similarity_score: score,
                });
            }
        }
    }

    matches
}

/// Overlapping windows of `size` whitespace-separated words.
/// Texts with fewer than `size` words have no windows.
pub fn word_chunks(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    words.windows(size).map(|window| window.join(" ")).collect()
}
