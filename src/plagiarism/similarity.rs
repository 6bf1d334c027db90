//! Sequence-alignment similarity between text fragments
//!
//! Scores are `2 * M / T`, where `M` is the number of characters covered by
//! the longest matching blocks of the two normalized fragments and `T` their
//! combined length.

use super::normalize::normalize;
use std::collections::HashMap;

/// Fragments shorter than this (in characters, after normalization) score 0.0
pub const MIN_FRAGMENT_LEN: usize = 10;

/// Sequences at least this long get popular-element pruning
const AUTOJUNK_MIN_LEN: usize = 200;

/// A normalized fragment, ready for repeated comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    chars: Vec<char>,
}

impl Fragment {
    pub fn new(text: &str) -> Self {
        Self {
            chars: normalize(text).chars().collect(),
        }
    }

    /// Length in characters after normalization
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }
}

/// Similarity of two raw fragments in `[0, 1]`.
///
/// Both inputs are normalized first. Returns 0.0 when either side is shorter
/// than [`MIN_FRAGMENT_LEN`]. Symmetric in its arguments.
pub fn similarity(a: &str, b: &str) -> f64 {
    fragment_similarity(&Fragment::new(a), &Fragment::new(b), MIN_FRAGMENT_LEN)
}

/// Similarity of two pre-normalized fragments with an explicit length floor
pub fn fragment_similarity(a: &Fragment, b: &Fragment, min_len: usize) -> f64 {
    if a.len() < min_len || b.len() < min_len {
        return 0.0;
    }

    // Alignment is order-sensitive on ties; fix the order so the score is not.
    let (first, second) = if a.chars <= b.chars {
        (&a.chars, &b.chars)
    } else {
        (&b.chars, &a.chars)
    };

    sequence_ratio(first, second)
}

/// Matching-blocks ratio of two character sequences
pub fn sequence_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = SequenceMatcher::new(a, b).matched_chars();
    let ratio = 2.0 * matched as f64 / total as f64;
    ratio.clamp(0.0, 1.0)
}

/// Ratcliff/Obershelp style matcher over characters
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        // Characters that make up more than 1% of a long sequence are too
        // common to anchor a match on.
        if b.len() >= AUTOJUNK_MIN_LEN {
            let popular_limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular_limit);
        }

        Self { a, b, b2j }
    }

    /// Total characters covered by all matching blocks
    fn matched_chars(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
            let (i, j, size) = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if size == 0 {
                continue;
            }

            matched += size;
            if a_lo < i && b_lo < j {
                queue.push((a_lo, i, b_lo, j));
            }
            if i + size < a_hi && j + size < b_hi {
                queue.push((i + size, a_hi, j + size, b_hi));
            }
        }

        matched
    }

    /// Longest block `a[i..i+size] == b[j..j+size]` inside the given window.
    /// Ties resolve to the earliest start in `a`, then in `b`.
    fn find_longest_match(
        &self,
        a_lo: usize,
        a_hi: usize,
        b_lo: usize,
        b_hi: usize,
    ) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let mut best_i = a_lo;
        let mut best_j = b_lo;
        let mut best_size = 0;

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();

            if let Some(positions) = self.b2j.get(c) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }

                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);

                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }

            j2len = next_j2len;
        }

        // Pruned characters never seed a block but may still extend one.
        while best_i > a_lo && best_j > b_lo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}
