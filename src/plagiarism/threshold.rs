//! Length-adaptive acceptance thresholds
//!
//! Short fragments are generic and need a high score to be flagged; long
//! fragments rarely match moderately by chance, so a lower bar suffices.

pub const MIN_THRESHOLD: f64 = 0.3;
pub const MAX_THRESHOLD: f64 = 0.7;

/// At or below this many characters the strictest threshold applies
pub const SHORT_LEN: usize = 50;
/// At or above this many characters the loosest threshold applies
pub const LONG_LEN: usize = 500;

/// Acceptance threshold for a fragment, in `[MIN_THRESHOLD, MAX_THRESHOLD]`.
/// Length is counted in characters.
pub fn threshold_for(text: &str) -> f64 {
    threshold_for_len(text.chars().count())
}

pub fn threshold_for_len(len: usize) -> f64 {
    if len <= SHORT_LEN {
        MAX_THRESHOLD
    } else if len >= LONG_LEN {
        MIN_THRESHOLD
    } else {
        let ratio = (len - SHORT_LEN) as f64 / (LONG_LEN - SHORT_LEN) as f64;
        MAX_THRESHOLD - ratio * (MAX_THRESHOLD - MIN_THRESHOLD)
    }
}
