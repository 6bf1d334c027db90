//! Server and detection configuration
//!
//! Everything has a compiled-in default; deployments override a handful of
//! values through `PLAGIARISM_*` environment variables.

use crate::error::{Error, Result};
use crate::plagiarism::similarity::MIN_FRAGMENT_LEN;
use crate::plagiarism::threshold::MIN_THRESHOLD;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// High threshold of the strict (default) detection preset
pub const STRICT_HIGH_THRESHOLD: f64 = 0.8;
/// High threshold of the paraphrase detection preset
pub const PARAPHRASE_HIGH_THRESHOLD: f64 = 0.6;
/// Words per sliding chunk in the fallback tier
pub const CHUNK_WORDS: usize = 3;
/// Lines shorter than this are skipped in TF-IDF mode
pub const MIN_DOCUMENT_LINE_LEN: usize = 20;
/// Default upload limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// How candidate lines are scored against known sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Character alignment ratio with chunk fallback
    #[default]
    Sequence,
    /// TF-IDF cosine with length-adaptive thresholds
    Tfidf,
}

impl FromStr for ScoringMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(ScoringMode::Sequence),
            "tfidf" => Ok(ScoringMode::Tfidf),
            other => Err(Error::Config {
                key: "mode".to_string(),
                reason: format!("unknown scoring mode '{}'", other),
            }),
        }
    }
}

/// Tunables of the match engine
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Line score that flags a match directly, and chunk score that confirms
    /// a partial one
    pub high_threshold: f64,
    /// Lowest line score that triggers the chunk scan
    pub partial_floor: f64,
    /// Normalized fragments shorter than this score 0.0
    pub min_fragment_len: usize,
    /// Words per sliding chunk
    pub chunk_words: usize,
    /// TF-IDF mode skips lines shorter than this
    pub min_document_line_len: usize,
    pub mode: ScoringMode,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl DetectionConfig {
    pub fn strict() -> Self {
        Self {
            high_threshold: STRICT_HIGH_THRESHOLD,
            partial_floor: MIN_THRESHOLD,
            min_fragment_len: MIN_FRAGMENT_LEN,
            chunk_words: CHUNK_WORDS,
            min_document_line_len: MIN_DOCUMENT_LINE_LEN,
            mode: ScoringMode::Sequence,
        }
    }

    pub fn paraphrase() -> Self {
        Self {
            high_threshold: PARAPHRASE_HIGH_THRESHOLD,
            ..Self::strict()
        }
    }

    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Security and resource configuration for the plagiarism server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directories path sources may be read from (empty allows any path)
    pub resource_dirs: Vec<String>,
    /// Maximum total bytes in the document cache (default: 256MB)
    pub cache_max_bytes: usize,
    /// Maximum number of cache entries (default: 100)
    pub cache_max_entries: usize,
    /// Largest document accepted for checking (default: 10MB)
    pub max_upload_bytes: u64,
    /// Glob patterns of corpus files loaded at startup
    pub corpus_paths: Vec<String>,
    pub detection: DetectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            resource_dirs: Vec::new(),
            cache_max_bytes: 256 * 1024 * 1024, // 256MB
            cache_max_entries: 100,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            corpus_paths: Vec::new(),
            detection: DetectionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PLAGIARISM_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dirs) = lookup("PLAGIARISM_RESOURCE_DIRS") {
            config.resource_dirs = split_list(&dirs);
        }
        if let Some(patterns) = lookup("PLAGIARISM_CORPUS") {
            config.corpus_paths = split_list(&patterns);
        }
        if let Some(raw) = lookup("PLAGIARISM_HIGH_THRESHOLD") {
            let value: f64 = parse_value("PLAGIARISM_HIGH_THRESHOLD", &raw)?;
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config {
                    key: "PLAGIARISM_HIGH_THRESHOLD".to_string(),
                    reason: format!("{} is outside [0, 1]", value),
                });
            }
            config.detection.high_threshold = value;
        }
        if let Some(raw) = lookup("PLAGIARISM_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_value("PLAGIARISM_MAX_UPLOAD_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("PLAGIARISM_MODE") {
            config.detection.mode = raw.parse()?;
        }

        Ok(config)
    }
}

/// Split a comma separated list, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| Error::Config {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
