//! Corpus of known sources
//!
//! A [`Corpus`] is a cheaply clonable snapshot: clones share entries until one
//! side is modified. Checks run against a clone, so concurrent edits by the
//! owner never affect a check in flight.

use super::KnownSource;
use crate::error::{Error, Result};
use rmcp::schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Collection of reference fragments
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Arc<Vec<KnownSource>>,
}

/// Per-label line count
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SourceSummary {
    pub source: String,
    pub lines: u32,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: Vec<KnownSource>) -> Self {
        Self {
            entries: Arc::new(sources),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[KnownSource] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownSource> {
        self.entries.iter()
    }

    pub fn add_source(&mut self, source: KnownSource) {
        Arc::make_mut(&mut self.entries).push(source);
    }

    /// Add each non-empty line of `text` under `label`, numbered from 1.
    /// Returns the number of lines added.
    pub fn add_text(&mut self, label: &str, text: &str) -> usize {
        self.add_lines(label, text.lines())
    }

    /// Add already-extracted lines under `label`, skipping blank ones
    pub fn add_lines<I, S>(&mut self, label: &str, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = Arc::make_mut(&mut self.entries);
        let before = entries.len();

        let fresh = lines
            .into_iter()
            .filter_map(|line| {
                let trimmed = line.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .zip(1u32..)
            .map(|(text, line_number)| KnownSource {
                text,
                source: label.to_string(),
                line_number,
            });
        entries.extend(fresh);

        entries.len() - before
    }

    /// Drop every entry with this label; returns how many were removed
    pub fn remove_label(&mut self, label: &str) -> usize {
        if !self.entries.iter().any(|s| s.source == label) {
            return 0;
        }
        let entries = Arc::make_mut(&mut self.entries);
        let before = entries.len();
        entries.retain(|s| s.source != label);
        before - entries.len()
    }

    pub fn clear(&mut self) {
        self.entries = Arc::new(Vec::new());
    }

    pub fn extend(&mut self, other: Corpus) {
        if other.is_empty() {
            return;
        }
        let incoming = Arc::try_unwrap(other.entries).unwrap_or_else(|shared| (*shared).clone());
        Arc::make_mut(&mut self.entries).extend(incoming);
    }

    /// Labels in lexical order with their line counts
    pub fn labels(&self) -> Vec<SourceSummary> {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for entry in self.entries.iter() {
            *counts.entry(entry.source.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(source, lines)| SourceSummary {
                source: source.to_string(),
                lines,
            })
            .collect()
    }

    /// Load a JSON array of `{text, source, line_number}` objects
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let sources: Vec<KnownSource> =
            serde_json::from_str(&data).map_err(|e| Error::InvalidCorpus {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(bad) = sources.iter().find(|s| s.line_number == 0) {
            return Err(Error::InvalidCorpus {
                path: path.display().to_string(),
                reason: format!("line_number must be at least 1 (source '{}')", bad.source),
            });
        }

        Ok(Self::from_sources(sources))
    }

    /// Load a plain text file, one fragment per line, labelled by file stem
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut corpus = Self::new();
        corpus.add_text(&label, &text);
        Ok(corpus)
    }

    /// Load every `.json`, `.txt` and `.md` file matching a glob pattern
    pub fn load_glob(pattern: &str) -> Result<Self> {
        let mut corpus = Self::new();

        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }

            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let loaded = match extension.as_str() {
                "json" => Self::load_json(&path)?,
                "txt" | "md" => Self::load_text(&path)?,
                _ => {
                    tracing::debug!(path = %path.display(), "skipping unsupported corpus file");
                    continue;
                }
            };

            tracing::info!(path = %path.display(), entries = loaded.len(), "loaded corpus file");
            corpus.extend(loaded);
        }

        Ok(corpus)
    }
}
