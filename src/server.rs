//! MCP server exposing the plagiarism checker as tools

use crate::config::{DetectionConfig, ScoringMode, ServerConfig};
use crate::error::Error;
use crate::pdf::{PdfiumExtractor, TextExtractor};
use crate::plagiarism::{
    check_document, check_text, compare_documents, Corpus, DocumentComparison, PlagiarismMatch,
    PlagiarismResult, SourceSummary,
};
use crate::source::{resolve_base64, resolve_cache, resolve_path, DocumentCache, ResolvedDocument};
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where a document comes from
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum DocumentSource {
    /// File path (absolute or relative)
    Path {
        /// Path to the PDF file
        path: String,
    },
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
    },
    /// Reference to a cached upload
    CacheRef {
        /// Cache key from a previous check
        cache_key: String,
    },
}

impl<'de> serde::Deserialize<'de> for DocumentSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let obj = value.as_object().ok_or_else(|| {
            serde::de::Error::custom(
                "Invalid source: expected an object with one of \"path\", \"base64\", or \"cache_key\"",
            )
        })?;

        let string_field = |key: &str| -> std::result::Result<Option<String>, D::Error> {
            match obj.get(key) {
                None => Ok(None),
                Some(v) => v
                    .as_str()
                    .map(|s| Some(s.to_string()))
                    .ok_or_else(|| serde::de::Error::custom(format!("\"{}\" must be a string", key))),
            }
        };

        if let Some(path) = string_field("path")? {
            return Ok(DocumentSource::Path { path });
        }
        if let Some(base64) = string_field("base64")? {
            return Ok(DocumentSource::Base64 { base64 });
        }
        if let Some(cache_key) = string_field("cache_key")? {
            return Ok(DocumentSource::CacheRef { cache_key });
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected one of \"path\", \"base64\", or \"cache_key\", but got keys: {:?}",
            keys
        )))
    }
}

/// Plagiarism MCP Server
#[derive(Clone)]
pub struct PlagiarismServer {
    corpus: Arc<RwLock<Corpus>>,
    cache: Arc<DocumentCache>,
    tool_router: ToolRouter<Self>,
    config: Arc<ServerConfig>,
}

// ============================================================================
// Request/Response types for check_plagiarism
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckPlagiarismParams {
    /// PDF documents to check
    pub sources: Vec<DocumentSource>,
    /// Scoring mode: "sequence" (default) or "tfidf"
    #[serde(default)]
    pub mode: Option<ScoringMode>,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
    /// Keep the uploaded document and return a cache key
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CheckPlagiarismResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    pub plagiarized: bool,
    pub matches: Vec<PlagiarismMatch>,
    pub error: Option<String>,
    /// RFC 3339 timestamp of the check
    pub checked_at: String,
}

// ============================================================================
// Request/Response types for check_text and compare_texts
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckTextParams {
    /// Text to check, one candidate per line
    pub text: String,
    /// Scoring mode: "sequence" (default) or "tfidf"
    #[serde(default)]
    pub mode: Option<ScoringMode>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompareTextsParams {
    pub text_a: String,
    pub text_b: String,
}

// ============================================================================
// Request/Response types for corpus management
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddKnownSourceParams {
    /// Label reported in matches against this text
    pub source: String,
    /// Reference text; every non-empty line becomes one known source
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddReferencePdfParams {
    /// PDF whose text becomes reference material
    pub source: DocumentSource,
    /// Label reported in matches against this document
    pub label: String,
    /// Password for encrypted PDFs
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CorpusUpdateResult {
    pub source: String,
    pub lines_added: u32,
    pub lines_removed: u32,
    pub corpus_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListKnownSourcesParams {
    /// Only report this label
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListKnownSourcesResult {
    pub sources: Vec<SourceSummary>,
    pub total_lines: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RemoveKnownSourceParams {
    /// Label to remove
    pub source: String,
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl PlagiarismServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a server with an empty corpus
    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_corpus(config, Corpus::new())
    }

    /// Create a server with a preloaded corpus
    pub fn with_corpus(config: ServerConfig, corpus: Corpus) -> Self {
        let cache = DocumentCache::new(config.cache_max_entries, config.cache_max_bytes);
        Self {
            corpus: Arc::new(RwLock::new(corpus)),
            cache: Arc::new(cache),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Check PDF documents for plagiarism against the known sources
    #[tool(
        description = "Check PDF documents for text copied from the known-source corpus. Returns, per document, whether it is plagiarized and the best match per line, ordered by similarity.

Source format: each element must be one of {\"path\": \"/absolute/path.pdf\"}, {\"base64\": \"...\"}, or {\"cache_key\": \"...\"}"
    )]
    async fn check_plagiarism(
        &self,
        Parameters(params): Parameters<CheckPlagiarismParams>,
    ) -> String {
        let mut results = Vec::new();

        for source in &params.sources {
            let result = self
                .process_check_plagiarism(source, &params)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "check_plagiarism failed");
                    CheckPlagiarismResult {
                        source: Self::source_name(source),
                        cache_key: None,
                        plagiarized: false,
                        matches: vec![],
                        error: Some(e.client_message()),
                        checked_at: chrono::Utc::now().to_rfc3339(),
                    }
                });
            results.push(result);
        }

        let response = serde_json::json!({ "results": results });
        serde_json::to_string_pretty(&response).unwrap_or_default()
    }

    /// Check raw text for plagiarism
    #[tool(
        description = "Check plain text for plagiarism against the known-source corpus. Each non-empty line is compared separately."
    )]
    async fn check_text(&self, Parameters(params): Parameters<CheckTextParams>) -> String {
        let result = self.process_check_text(&params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Compare two texts directly
    #[tool(
        description = "Compare two texts as whole documents. Returns the character alignment ratio, the TF-IDF cosine similarity, the length-adaptive threshold and whether the texts count as similar."
    )]
    async fn compare_texts(&self, Parameters(params): Parameters<CompareTextsParams>) -> String {
        let comparison = self.process_compare_texts(params).await;
        serde_json::to_string_pretty(&comparison).unwrap_or_default()
    }

    /// Add reference text to the corpus
    #[tool(
        description = "Add reference text to the known-source corpus under a label. Each non-empty line becomes a separate source line."
    )]
    async fn add_known_source(
        &self,
        Parameters(params): Parameters<AddKnownSourceParams>,
    ) -> String {
        let result = self.process_add_known_source(&params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Add the text of a PDF to the corpus
    #[tool(
        description = "Extract the text of a PDF and add it to the known-source corpus under a label.

Source format: one of {\"path\": \"/absolute/path.pdf\"}, {\"base64\": \"...\"}, or {\"cache_key\": \"...\"}"
    )]
    async fn add_reference_pdf(
        &self,
        Parameters(params): Parameters<AddReferencePdfParams>,
    ) -> String {
        let result = self
            .process_add_reference_pdf(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "add_reference_pdf failed");
                CorpusUpdateResult {
                    source: params.label.clone(),
                    lines_added: 0,
                    lines_removed: 0,
                    corpus_size: 0,
                    error: Some(e.client_message()),
                }
            });
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// List corpus labels
    #[tool(description = "List the labels in the known-source corpus with their line counts.")]
    async fn list_known_sources(
        &self,
        Parameters(params): Parameters<ListKnownSourcesParams>,
    ) -> String {
        let result = self.process_list_known_sources(&params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Remove a label from the corpus
    #[tool(description = "Remove every line stored under a label from the known-source corpus.")]
    async fn remove_known_source(
        &self,
        Parameters(params): Parameters<RemoveKnownSourceParams>,
    ) -> String {
        let result = self.process_remove_known_source(&params).await;
        serde_json::to_string_pretty(&result).unwrap_or_default()
    }
}

impl PlagiarismServer {
    fn source_name(source: &DocumentSource) -> String {
        match source {
            DocumentSource::Path { path } => path.clone(),
            DocumentSource::Base64 { .. } => "<base64>".to_string(),
            DocumentSource::CacheRef { cache_key } => format!("<cache:{}>", cache_key),
        }
    }

    fn resolve_source(&self, source: &DocumentSource) -> crate::error::Result<ResolvedDocument> {
        let max_bytes = self.config.max_upload_bytes;
        match source {
            DocumentSource::Path { path } => {
                let allowed = self.validate_path_access(path)?;
                resolve_path(allowed, max_bytes)
            }
            DocumentSource::Base64 { base64 } => resolve_base64(base64, max_bytes),
            DocumentSource::CacheRef { cache_key } => resolve_cache(cache_key, &self.cache),
        }
    }

    /// Validate that a path is within allowed resource directories.
    /// If no resource_dirs are configured, all paths are allowed.
    fn validate_path_access(&self, path: &str) -> crate::error::Result<std::path::PathBuf> {
        if self.config.resource_dirs.is_empty() {
            return Ok(std::path::PathBuf::from(path));
        }

        let denied = || Error::PathAccessDenied {
            path: path.to_string(),
        };
        let canonical = std::fs::canonicalize(path).map_err(|_| denied())?;

        let inside = self.config.resource_dirs.iter().any(|dir| {
            std::fs::canonicalize(dir)
                .map(|canonical_dir| canonical.starts_with(canonical_dir))
                .unwrap_or(false)
        });

        if inside {
            Ok(canonical)
        } else {
            Err(denied())
        }
    }

    fn detection_for(&self, mode: Option<ScoringMode>) -> DetectionConfig {
        let detection = self.config.detection.clone();
        match mode {
            Some(mode) => detection.with_mode(mode),
            None => detection,
        }
    }

    /// Copy-on-write snapshot; the lock is released before any checking
    async fn corpus_snapshot(&self) -> Corpus {
        self.corpus.read().await.clone()
    }

    pub async fn process_check_plagiarism(
        &self,
        source: &DocumentSource,
        params: &CheckPlagiarismParams,
    ) -> crate::error::Result<CheckPlagiarismResult> {
        let resolved = self.resolve_source(source)?;
        let extractor = PdfiumExtractor::with_password(params.password.clone());
        self.check_resolved(resolved, extractor, params.mode, params.cache)
            .await
    }

    /// Check resolved bytes; the upload is cached only once the check succeeds
    async fn check_resolved<E>(
        &self,
        resolved: ResolvedDocument,
        extractor: E,
        mode: Option<ScoringMode>,
        cache: bool,
    ) -> crate::error::Result<CheckPlagiarismResult>
    where
        E: TextExtractor + Send + 'static,
    {
        let ResolvedDocument { data, source_name } = resolved;
        let corpus = self.corpus_snapshot().await;
        let detection = self.detection_for(mode);
        let task_data = Arc::clone(&data);

        // Move CPU-heavy matching to the blocking thread pool
        let joined = tokio::task::spawn_blocking(move || {
            check_document(&extractor, &task_data, &corpus, &detection)
        })
        .await;

        let result = match joined {
            Ok(outcome) => outcome?,
            Err(e) => {
                let err = Error::TaskJoin {
                    reason: e.to_string(),
                };
                tracing::error!(error = %err, source = %source_name, "plagiarism check aborted");
                PlagiarismResult::failed(err.client_message())
            }
        };

        let cache_key = if cache {
            let key = self.cache.insert(data);
            tracing::debug!(
                cached = key.is_some(),
                entries = self.cache.len(),
                bytes = self.cache.total_bytes(),
                "document cache updated"
            );
            key
        } else {
            None
        };

        tracing::info!(
            source = %source_name,
            plagiarized = result.plagiarized,
            matches = result.matches.len(),
            "plagiarism check finished"
        );

        Ok(CheckPlagiarismResult {
            source: source_name,
            cache_key,
            plagiarized: result.plagiarized,
            matches: result.matches,
            error: result.error,
            checked_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub async fn process_check_text(&self, params: &CheckTextParams) -> PlagiarismResult {
        let corpus = self.corpus_snapshot().await;
        let detection = self.detection_for(params.mode);
        let text = params.text.clone();

        tokio::task::spawn_blocking(move || check_text(&text, &corpus, &detection))
            .await
            .unwrap_or_else(|e| {
                let err = Error::TaskJoin {
                    reason: e.to_string(),
                };
                tracing::error!(error = %err, "text check aborted");
                PlagiarismResult::failed(err.client_message())
            })
    }

    pub async fn process_compare_texts(&self, params: CompareTextsParams) -> DocumentComparison {
        let CompareTextsParams { text_a, text_b } = params;
        match tokio::task::spawn_blocking(move || compare_documents(&text_a, &text_b)).await {
            Ok(comparison) => comparison,
            Err(e) => {
                tracing::error!(error = %e, "text comparison aborted");
                DocumentComparison {
                    sequence_similarity: 0.0,
                    tfidf_similarity: 0.0,
                    threshold: crate::plagiarism::threshold::MAX_THRESHOLD,
                    similar: false,
                }
            }
        }
    }

    pub async fn process_add_known_source(&self, params: &AddKnownSourceParams) -> CorpusUpdateResult {
        let mut corpus = self.corpus.write().await;
        let added = corpus.add_text(&params.source, &params.text);
        tracing::info!(source = %params.source, lines = added, "added known source");

        CorpusUpdateResult {
            source: params.source.clone(),
            lines_added: added as u32,
            lines_removed: 0,
            corpus_size: corpus.len() as u32,
            error: None,
        }
    }

    pub async fn process_add_reference_pdf(
        &self,
        params: &AddReferencePdfParams,
    ) -> crate::error::Result<CorpusUpdateResult> {
        let resolved = self.resolve_source(&params.source)?;
        let extractor = PdfiumExtractor::with_password(params.password.clone());
        let data = resolved.data;

        let lines = tokio::task::spawn_blocking(move || extractor.extract_lines(&data))
            .await
            .map_err(|e| Error::TaskJoin {
                reason: e.to_string(),
            })??;

        if lines.is_empty() {
            return Err(Error::NoTextContent);
        }

        let mut corpus = self.corpus.write().await;
        let added = corpus.add_lines(&params.label, lines);
        tracing::info!(
            source = %params.label,
            document = %resolved.source_name,
            lines = added,
            "added reference pdf"
        );

        Ok(CorpusUpdateResult {
            source: params.label.clone(),
            lines_added: added as u32,
            lines_removed: 0,
            corpus_size: corpus.len() as u32,
            error: None,
        })
    }

    pub async fn process_list_known_sources(
        &self,
        params: &ListKnownSourcesParams,
    ) -> ListKnownSourcesResult {
        let corpus = self.corpus.read().await;
        let sources: Vec<SourceSummary> = corpus
            .labels()
            .into_iter()
            .filter(|summary| params.source.as_ref().map_or(true, |s| &summary.source == s))
            .collect();
        let total_lines = sources.iter().map(|s| s.lines).sum();

        ListKnownSourcesResult {
            sources,
            total_lines,
        }
    }

    pub async fn process_remove_known_source(
        &self,
        params: &RemoveKnownSourceParams,
    ) -> CorpusUpdateResult {
        let mut corpus = self.corpus.write().await;
        let removed = corpus.remove_label(&params.source);
        tracing::info!(source = %params.source, lines = removed, "removed known source");

        CorpusUpdateResult {
            source: params.source.clone(),
            lines_added: 0,
            lines_removed: removed as u32,
            corpus_size: corpus.len() as u32,
            error: None,
        }
    }
}

impl Default for PlagiarismServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for PlagiarismServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF plagiarism server: manage a corpus of known source texts, then check PDFs \
                 or plain text against it. Matches report the copied line, the source label and \
                 a similarity score in [0, 1]."
                    .into(),
            ),
        }
    }
}

/// Load every configured corpus pattern into one corpus
pub fn load_configured_corpus(config: &ServerConfig) -> crate::error::Result<Corpus> {
    let mut corpus = Corpus::new();
    for pattern in &config.corpus_paths {
        corpus.extend(Corpus::load_glob(pattern)?);
    }
    Ok(corpus)
}

/// Run the MCP server with the default configuration
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let corpus = load_configured_corpus(&config)?;
    tracing::info!(
        entries = corpus.len(),
        labels = corpus.labels().len(),
        high_threshold = config.detection.high_threshold,
        "corpus loaded"
    );

    let server = PlagiarismServer::with_corpus(config, corpus);

    tracing::info!("Plagiarism MCP Server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use pretty_assertions::assert_eq;

    fn server_with(sources: &[(&str, &str)]) -> PlagiarismServer {
        let mut corpus = Corpus::new();
        for (label, text) in sources {
            corpus.add_text(label, text);
        }
        PlagiarismServer::with_corpus(ServerConfig::default(), corpus)
    }

    /// Stands in for PDFium on documents that pass the header check
    enum CannedExtractor {
        Lines(Vec<&'static str>),
        Unreadable,
    }

    impl TextExtractor for CannedExtractor {
        fn extract_lines(&self, _data: &[u8]) -> crate::error::Result<Vec<String>> {
            match self {
                CannedExtractor::Lines(lines) => Ok(lines.iter().map(|l| l.to_string()).collect()),
                CannedExtractor::Unreadable => Err(Error::InvalidPdf {
                    reason: "Failed to parse document".to_string(),
                }),
            }
        }
    }

    fn pdf_upload() -> ResolvedDocument {
        ResolvedDocument {
            data: Arc::new(b"%PDF-1.7 truncated".to_vec()),
            source_name: "<base64>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_not_cached() {
        let server = server_with(&[("Pangram", "The quick brown fox jumps over the lazy dog.")]);

        let err = server
            .check_resolved(pdf_upload(), CannedExtractor::Unreadable, None, true)
            .await
            .unwrap_err();

        assert!(err.is_invalid_document());
        assert!(server.cache.is_empty());
        assert_eq!(server.cache.total_bytes(), 0);
    }

    #[tokio::test]
    async fn test_checked_pdf_is_cached_on_request() {
        let server = server_with(&[("Pangram", "The quick brown fox jumps over the lazy dog.")]);
        let extractor =
            CannedExtractor::Lines(vec!["The quick brown fox jumps over the lazy dog."]);

        let result = server
            .check_resolved(pdf_upload(), extractor, None, true)
            .await
            .unwrap();

        assert!(result.plagiarized);
        let key = result.cache_key.expect("cache key");
        assert!(server.cache.get(&key).is_some());

        let uncached = server
            .check_resolved(pdf_upload(), CannedExtractor::Lines(vec!["Intro"]), None, false)
            .await
            .unwrap();
        assert_eq!(uncached.cache_key, None);
        assert_eq!(server.cache.len(), 1);
    }

    #[test]
    fn test_source_name() {
        assert_eq!(
            PlagiarismServer::source_name(&DocumentSource::Path {
                path: "/test.pdf".to_string()
            }),
            "/test.pdf"
        );
        assert_eq!(
            PlagiarismServer::source_name(&DocumentSource::Base64 {
                base64: "...".to_string()
            }),
            "<base64>"
        );
        assert_eq!(
            PlagiarismServer::source_name(&DocumentSource::CacheRef {
                cache_key: "abc123".to_string()
            }),
            "<cache:abc123>"
        );
    }

    #[test]
    fn test_document_source_deserialization() {
        let source: DocumentSource = serde_json::from_str(r#"{"path": "/test.pdf"}"#).unwrap();
        assert!(matches!(source, DocumentSource::Path { .. }));

        let source: DocumentSource = serde_json::from_str(r#"{"base64": "JVBERi0xLjQ="}"#).unwrap();
        assert!(matches!(source, DocumentSource::Base64 { .. }));

        let source: DocumentSource = serde_json::from_str(r#"{"cache_key": "abc"}"#).unwrap();
        assert!(matches!(source, DocumentSource::CacheRef { .. }));
    }

    #[test]
    fn test_document_source_rejects_bad_shapes() {
        let err = serde_json::from_str::<DocumentSource>(r#"{"url": "https://x"}"#).unwrap_err();
        assert!(err.to_string().contains("url"));

        let err = serde_json::from_str::<DocumentSource>(r#"{"path": 42}"#).unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        assert!(serde_json::from_str::<DocumentSource>(r#""/test.pdf""#).is_err());
    }

    #[test]
    fn test_params_deserialization() {
        let params: CheckPlagiarismParams = serde_json::from_str(
            r#"{"sources": [{"path": "/a.pdf"}], "mode": "tfidf"}"#,
        )
        .unwrap();
        assert_eq!(params.mode, Some(ScoringMode::Tfidf));
        assert!(!params.cache);
        assert!(params.password.is_none());
    }

    #[tokio::test]
    async fn test_check_plagiarism_rejects_non_pdf() {
        let server = server_with(&[("Pangram", "The quick brown fox jumps over the lazy dog.")]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"This is not a PDF file");
        let source = DocumentSource::Base64 { base64: encoded };
        let params = CheckPlagiarismParams {
            sources: vec![source.clone()],
            mode: None,
            password: None,
            cache: true,
        };

        let err = server
            .process_check_plagiarism(&source, &params)
            .await
            .unwrap_err();
        assert!(err.is_invalid_document());
        assert!(err.client_message().contains("Invalid PDF file"));

        // nothing is cached for a rejected upload
        assert!(server.cache.is_empty());
    }

    #[tokio::test]
    async fn test_check_plagiarism_tool_reports_error_per_source() {
        let server = server_with(&[]);
        let params = CheckPlagiarismParams {
            sources: vec![DocumentSource::CacheRef {
                cache_key: "missing".to_string(),
            }],
            mode: None,
            password: None,
            cache: false,
        };

        let response = server.check_plagiarism(Parameters(params)).await;
        let json: serde_json::Value = serde_json::from_str(&response).unwrap();
        let entry = &json["results"][0];
        assert_eq!(entry["source"], "<cache:missing>");
        assert_eq!(entry["plagiarized"], false);
        assert_eq!(entry["error"], "Cache key not found");
    }

    #[tokio::test]
    async fn test_check_text_against_corpus() {
        let server = server_with(&[("Pangram", "The quick brown fox jumps over the lazy dog.")]);
        let result = server
            .process_check_text(&CheckTextParams {
                text: "Intro line\nThe quick brown fox jumps over the lazy dog.".to_string(),
                mode: None,
            })
            .await;

        assert!(result.plagiarized);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].line_number, 2);
        assert_eq!(result.matches[0].source, "Pangram");
    }

    #[tokio::test]
    async fn test_corpus_management_round() {
        let server = server_with(&[]);

        let added = server
            .process_add_known_source(&AddKnownSourceParams {
                source: "Essay".to_string(),
                text: "Line one of the essay.\n\nLine two of the essay.".to_string(),
            })
            .await;
        assert_eq!(added.lines_added, 2);
        assert_eq!(added.corpus_size, 2);

        let listed = server
            .process_list_known_sources(&ListKnownSourcesParams { source: None })
            .await;
        assert_eq!(listed.total_lines, 2);
        assert_eq!(listed.sources[0].source, "Essay");

        let filtered = server
            .process_list_known_sources(&ListKnownSourcesParams {
                source: Some("Other".to_string()),
            })
            .await;
        assert!(filtered.sources.is_empty());

        let removed = server
            .process_remove_known_source(&RemoveKnownSourceParams {
                source: "Essay".to_string(),
            })
            .await;
        assert_eq!(removed.lines_removed, 2);
        assert_eq!(removed.corpus_size, 0);
    }

    #[tokio::test]
    async fn test_add_reference_pdf_rejects_non_pdf() {
        let server = server_with(&[]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"plain text");
        let err = server
            .process_add_reference_pdf(&AddReferencePdfParams {
                source: DocumentSource::Base64 { base64: encoded },
                label: "Ref".to_string(),
                password: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_invalid_document());
        assert!(server.corpus_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_compare_texts() {
        let server = PlagiarismServer::new();
        let text = "Neural networks approximate functions by composing simple layers.";
        let comparison = server
            .process_compare_texts(CompareTextsParams {
                text_a: text.to_string(),
                text_b: text.to_string(),
            })
            .await;
        assert!(comparison.similar);
        assert_eq!(comparison.sequence_similarity, 1.0);
    }

    #[test]
    fn test_path_sandbox() {
        let allowed = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let inside_file = allowed.path().join("doc.pdf");
        let outside_file = outside.path().join("doc.pdf");
        std::fs::write(&inside_file, b"%PDF-1.4").unwrap();
        std::fs::write(&outside_file, b"%PDF-1.4").unwrap();

        let server = PlagiarismServer::with_config(ServerConfig {
            resource_dirs: vec![allowed.path().display().to_string()],
            ..ServerConfig::default()
        });

        assert!(server
            .validate_path_access(&inside_file.display().to_string())
            .is_ok());
        assert!(matches!(
            server.validate_path_access(&outside_file.display().to_string()),
            Err(Error::PathAccessDenied { .. })
        ));
    }

    #[test]
    fn test_load_configured_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "alpha\nbeta").unwrap();
        let config = ServerConfig {
            corpus_paths: vec![format!("{}/*.txt", dir.path().display())],
            ..ServerConfig::default()
        };

        let corpus = load_configured_corpus(&config).unwrap();
        assert_eq!(corpus.len(), 2);
    }
}
