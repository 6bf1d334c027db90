//! Match deduplication and ranking

use super::{PlagiarismMatch, PlagiarismResult};
use std::collections::HashSet;

/// Rank matches by descending score and keep the best one per candidate line.
///
/// Equal scores keep their engine order. Deduplication is by line only; a
/// source may appear in several matches.
pub fn aggregate(mut matches: Vec<PlagiarismMatch>) -> PlagiarismResult {
    matches.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

    let mut seen_lines = HashSet::new();
    matches.retain(|m| seen_lines.insert(m.line_number));

    PlagiarismResult {
        plagiarized: !matches.is_empty(),
        matches,
        error: None,
    }
}
