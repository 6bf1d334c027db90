//! TF-IDF vector space scorer for paragraph and document comparison
//!
//! Terms are word n-grams (1..=3 by default) built after English stop words
//! are removed. Rows are weighted `tf * idf` with smoothed idf and L2
//! normalized, so the cosine of two rows is their dot product.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Vocabulary cap, by descending corpus frequency
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

lazy_static! {
    /// Tokens are runs of at least two word characters
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();

    static ref STOP_WORDS: HashSet<&'static str> = ENGLISH_STOP_WORDS.iter().copied().collect();
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "be", "became", "because", "become", "becomes",
    "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did",
    "do", "does", "doing", "done", "down", "during", "each", "either", "else", "elsewhere",
    "enough", "etc", "even", "ever", "every", "everyone", "everything", "everywhere",
    "except", "few", "for", "former", "formerly", "from", "further", "had", "has", "have",
    "having", "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hers",
    "herself", "him", "himself", "his", "how", "however", "i", "ie", "if", "in", "indeed",
    "into", "is", "it", "its", "itself", "just", "latter", "latterly", "least", "less",
    "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly",
    "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next",
    "no", "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off",
    "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
    "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please", "rather",
    "same", "seem", "seemed", "seeming", "seems", "several", "she", "should", "since", "so",
    "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still",
    "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they",
    "this", "those", "though", "through", "throughout", "thru", "thus", "to", "together",
    "too", "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether",
    "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Sparse, L2-normalized TF-IDF row
pub type TermVector = HashMap<String, f64>;

/// Builds TF-IDF rows over a small set of documents
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    /// Smallest and largest n-gram size, inclusive
    pub ngram_range: (usize, usize),
    pub max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            ngram_range: (1, 3),
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

impl TfidfVectorizer {
    /// Learn the vocabulary of `documents` and return one row per document.
    ///
    /// Fails with [`Error::EmptyVocabulary`] when no document yields a term.
    pub fn fit_transform(&self, documents: &[&str]) -> Result<Vec<TermVector>> {
        let counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| self.term_counts(doc)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for (term, &count) in doc {
                *document_frequency.entry(term.as_str()).or_default() += 1;
                *corpus_frequency.entry(term.as_str()).or_default() += count;
            }
        }

        if corpus_frequency.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        let vocabulary = self.limit_features(&corpus_frequency);

        let n_docs = documents.len() as f64;
        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: TermVector = doc
                    .iter()
                    .filter(|(term, _)| vocabulary.contains(term.as_str()))
                    .map(|(term, &tf)| {
                        let df = document_frequency[term.as_str()] as f64;
                        let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                        (term.clone(), tf as f64 * idf)
                    })
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(rows)
    }

    /// Stop-word-filtered n-gram counts of one document
    fn term_counts(&self, document: &str) -> HashMap<String, usize> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !STOP_WORDS.contains(token))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut counts = HashMap::new();
        for n in min_n.max(1)..=max_n {
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_default() += 1;
            }
        }
        counts
    }

    /// Keep the `max_features` most frequent terms; ties go to the
    /// lexicographically smaller term.
    fn limit_features<'a>(&self, corpus_frequency: &HashMap<&'a str, usize>) -> HashSet<&'a str> {
        if corpus_frequency.len() <= self.max_features {
            return corpus_frequency.keys().copied().collect();
        }

        let mut ranked: Vec<(&str, usize)> =
            corpus_frequency.iter().map(|(&t, &c)| (t, c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(self.max_features)
            .map(|(term, _)| term)
            .collect()
    }
}

fn l2_normalize(row: &mut TermVector) {
    let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in row.values_mut() {
            *weight /= norm;
        }
    }
}

/// Dot product of two normalized rows
fn dot(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum()
}

/// Cosine similarity of two texts in a vocabulary fitted on just those two
pub fn try_cosine_similarity(a: &str, b: &str) -> Result<f64> {
    let rows = TfidfVectorizer::default().fit_transform(&[a, b])?;
    Ok(dot(&rows[0], &rows[1]).clamp(0.0, 1.0))
}

/// Like [`try_cosine_similarity`], but degenerate input scores 0.0
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    try_cosine_similarity(a, b).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "tfidf scoring failed, using 0.0");
        0.0
    })
}
