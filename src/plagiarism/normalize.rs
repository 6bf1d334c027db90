//! Text canonicalization for stable comparison

use unicode_normalization::UnicodeNormalization;

/// Canonicalize a fragment for line-level comparison.
///
/// NFKD-decomposes, lower-cases, drops every character that is neither a word
/// character nor whitespace, then collapses whitespace runs. Digits are kept.
/// Total and deterministic: characters it cannot classify are dropped.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .flat_map(char::to_lowercase)
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .collect();

    collapse_whitespace(&folded)
}

/// Canonicalize a document down to its English word content.
///
/// Like [`normalize`], but folds to ASCII and also removes digit runs. Text in
/// other scripts vanishes entirely, so line and document scoring use
/// [`normalize`] instead.
pub fn normalize_document(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .filter(|&c| (is_word_char(c) && !c.is_ascii_digit()) || c.is_whitespace())
        .collect();

    collapse_whitespace(&folded)
}

/// Word character: letter, number or underscore.
/// Combining marks left over from decomposition are not word characters.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
