//! Integration tests for PDF Plagiarism Server

use pdf_plagiarism_server::config::DetectionConfig;
use pdf_plagiarism_server::pdf::{PdfiumExtractor, TextExtractor};
use pdf_plagiarism_server::plagiarism::{
    aggregate, candidate_lines, check_lines, similarity, threshold_for, Corpus, KnownSource,
    PlagiarismMatch,
};
use pdf_plagiarism_server::{check_document, check_text, compare_documents, Error, ScoringMode};
use pretty_assertions::assert_eq;
use rstest::rstest;

const PANGRAM: &str = "The quick brown fox jumps over the lazy dog.";

/// Extractor returning canned lines, standing in for a parsed PDF
struct StaticExtractor(Vec<&'static str>);

impl TextExtractor for StaticExtractor {
    fn extract_lines(&self, _data: &[u8]) -> pdf_plagiarism_server::Result<Vec<String>> {
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}

fn pangram_corpus() -> Corpus {
    Corpus::from_sources(vec![KnownSource {
        text: PANGRAM.to_string(),
        source: "Test Source".to_string(),
        line_number: 1,
    }])
}

fn two_source_corpus() -> Corpus {
    Corpus::from_sources(vec![
        KnownSource {
            text: "Artificial intelligence is transforming the world.".to_string(),
            source: "Source 1".to_string(),
            line_number: 1,
        },
        KnownSource {
            text: "Machine learning models require large datasets.".to_string(),
            source: "Source 2".to_string(),
            line_number: 1,
        },
    ])
}

#[rstest]
#[case::strict(DetectionConfig::strict())]
#[case::paraphrase(DetectionConfig::paraphrase())]
fn test_exact_copy_is_detected(#[case] config: DetectionConfig) {
    let result = check_text(PANGRAM, &pangram_corpus(), &config);

    assert!(result.plagiarized);
    assert_eq!(result.error, None);
    assert_eq!(result.matches.len(), 1);

    let m = &result.matches[0];
    assert_eq!(m.text, PANGRAM);
    assert_eq!(m.source, "Test Source");
    assert_eq!(m.line_number, 1);
    assert_eq!(m.source_line_number, 1);
    assert!(m.similarity_score > 0.9);
}

#[rstest]
#[case::strict(DetectionConfig::strict())]
#[case::paraphrase(DetectionConfig::paraphrase())]
fn test_original_text_is_clean(#[case] config: DetectionConfig) {
    let result = check_text(
        "This is completely original content.",
        &pangram_corpus(),
        &config,
    );

    assert!(!result.plagiarized);
    assert!(result.matches.is_empty());
    assert_eq!(result.error, None);
}

#[rstest]
#[case::strict(DetectionConfig::strict())]
#[case::paraphrase(DetectionConfig::paraphrase())]
fn test_partial_copy_scores_in_middle_band(#[case] config: DetectionConfig) {
    let result = check_text("The quick brown fox is running.", &pangram_corpus(), &config);

    assert!(result.plagiarized);
    assert_eq!(result.matches.len(), 1);
    let score = result.matches[0].similarity_score;
    assert!(score > 0.3 && score < 0.7, "score was {}", score);
}

#[rstest]
#[case::strict(DetectionConfig::strict())]
#[case::paraphrase(DetectionConfig::paraphrase())]
fn test_each_line_matches_its_own_source(#[case] config: DetectionConfig) {
    let text = "Artificial intelligence is changing the world.\n\
                Machine learning needs big datasets.";
    let result = check_text(text, &two_source_corpus(), &config);

    assert!(result.plagiarized);
    assert_eq!(result.matches.len(), 2);

    let first = &result.matches[0];
    assert_eq!(first.line_number, 1);
    assert_eq!(first.source, "Source 1");

    let second = &result.matches[1];
    assert_eq!(second.line_number, 2);
    assert_eq!(second.source, "Source 2");

    assert!(first.similarity_score >= second.similarity_score);
}

#[test]
fn test_invalid_pdf_bytes_are_rejected() {
    let extractor = PdfiumExtractor::new();
    let err = check_document(
        &extractor,
        b"This is not a PDF file",
        &pangram_corpus(),
        &DetectionConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::InvalidPdf { .. }));
    assert!(err.to_string().contains("Invalid PDF file"));
}

#[test]
fn test_document_lines_are_numbered_after_dropping_blanks() {
    let extractor = StaticExtractor(vec!["Preface", "", "   ", PANGRAM]);
    let result = check_document(
        &extractor,
        b"%PDF-1.4",
        &pangram_corpus(),
        &DetectionConfig::default(),
    )
    .unwrap();

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].line_number, 2);
}

#[test]
fn test_document_without_text_reports_error() {
    let extractor = StaticExtractor(vec!["", "  "]);
    let result = check_document(
        &extractor,
        b"%PDF-1.4",
        &pangram_corpus(),
        &DetectionConfig::default(),
    )
    .unwrap();

    assert!(!result.plagiarized);
    assert!(result.matches.is_empty());
    assert_eq!(result.error.as_deref(), Some("No text content found in PDF"));
}

#[test]
fn test_empty_corpus_is_clean_not_an_error() {
    let result = check_text(PANGRAM, &Corpus::new(), &DetectionConfig::default());

    assert!(!result.plagiarized);
    assert!(result.matches.is_empty());
    assert_eq!(result.error, None);
}

#[test]
fn test_best_source_wins_per_line() {
    let mut corpus = pangram_corpus();
    corpus.add_text("Near Copy", "The quick brown fox jumps over a lazy dog.");

    let result = check_text(PANGRAM, &corpus, &DetectionConfig::default());

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].source, "Test Source");
    assert_eq!(result.matches[0].similarity_score, 1.0);
}

#[test]
fn test_results_are_ranked_and_unique_per_line() {
    let mut corpus = two_source_corpus();
    corpus.add_text("Pangram", PANGRAM);
    let text = format!(
        "Machine learning needs big datasets.\n{}\nArtificial intelligence is changing the world.",
        PANGRAM
    );

    let result = check_text(&text, &corpus, &DetectionConfig::paraphrase());

    let scores: Vec<f64> = result.matches.iter().map(|m| m.similarity_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{:?}", scores);

    let mut lines: Vec<u32> = result.matches.iter().map(|m| m.line_number).collect();
    lines.sort_unstable();
    lines.dedup();
    assert_eq!(lines.len(), result.matches.len());
    assert_eq!(result.plagiarized, !result.matches.is_empty());
}

#[test]
fn test_aggregate_keeps_highest_score_per_line() {
    let m = |line_number: u32, source: &str, score: f64| PlagiarismMatch {
        text: format!("line {}", line_number),
        source: source.to_string(),
        line_number,
        source_line_number: 1,
        similarity_score: score,
    };

    let result = aggregate(vec![m(1, "A", 0.82), m(2, "B", 0.91), m(1, "C", 0.97)]);

    let picked: Vec<(u32, &str)> = result
        .matches
        .iter()
        .map(|m| (m.line_number, m.source.as_str()))
        .collect();
    assert_eq!(picked, vec![(1, "C"), (2, "B")]);
}

#[rstest]
#[case(PANGRAM, "The quick brown fox is running.")]
#[case("Artificial intelligence is transforming the world.", "Machine learning models require large datasets.")]
#[case("Completely unrelated sentence here", PANGRAM)]
fn test_similarity_is_symmetric_and_bounded(#[case] a: &str, #[case] b: &str) {
    let forward = similarity(a, b);
    let backward = similarity(b, a);

    assert_eq!(forward, backward);
    assert!((0.0..=1.0).contains(&forward));
    assert_eq!(similarity(a, a), 1.0);
}

#[test]
fn test_short_fragments_never_score() {
    assert_eq!(similarity("Hi there", "Hi there"), 0.0);
    assert_eq!(similarity("", PANGRAM), 0.0);
}

#[test]
fn test_threshold_relaxes_with_length() {
    let lengths = [0usize, 50, 120, 275, 499, 500, 2000];
    let thresholds: Vec<f64> = lengths
        .iter()
        .map(|&len| threshold_for(&"x".repeat(len)))
        .collect();

    assert!(thresholds.windows(2).all(|w| w[0] >= w[1]), "{:?}", thresholds);
    assert_eq!(thresholds[0], 0.7);
    assert_eq!(thresholds[1], 0.7);
    assert_eq!(thresholds[5], 0.3);
    assert_eq!(thresholds[6], 0.3);
}

#[test]
fn test_tfidf_mode_flags_long_copied_lines() {
    let corpus = Corpus::from_sources(vec![KnownSource {
        text: "Large language models memorize portions of their training data verbatim."
            .to_string(),
        source: "Memorization Study".to_string(),
        line_number: 4,
    }]);
    let config = DetectionConfig::default().with_mode(ScoringMode::Tfidf);
    let text = "Short line\n\
                Large language models memorize portions of their training data verbatim.";

    let result = check_text(text, &corpus, &config);

    assert!(result.plagiarized);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].line_number, 2);
    assert_eq!(result.matches[0].source_line_number, 4);
}

#[test]
fn test_compare_documents_separates_related_from_unrelated() {
    let abstract_text = "We study how transformer language models memorize training data. \
                         Larger models memorize more examples, and duplicated sequences are \
                         memorized far more often than unique ones.";
    let recipe = "A sourdough bread needs a lively starter, patient proofing and a very hot \
                  oven to develop an open crumb and a crackling crust.";

    let same = compare_documents(abstract_text, abstract_text);
    assert!(same.similar);
    assert!(same.tfidf_similarity > 0.99);

    let different = compare_documents(abstract_text, recipe);
    assert!(!different.similar);
    assert!(different.tfidf_similarity < different.threshold);
}

#[test]
fn test_corpus_loaded_from_disk_drives_checks() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("fox.txt"),
        format!("Opening remark\n\n{}\n", PANGRAM),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("ai.json"),
        r#"[{"text": "Artificial intelligence is transforming the world.", "source": "AI Essay", "line_number": 7}]"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("ignored.csv"), "a,b,c").unwrap();

    let corpus = Corpus::load_glob(&format!("{}/*", dir.path().display())).unwrap();
    assert_eq!(corpus.len(), 3);

    let text = format!("{}\nArtificial intelligence is transforming the world.", PANGRAM);
    let result = check_text(&text, &corpus, &DetectionConfig::default());

    assert_eq!(result.matches.len(), 2);
    let fox = result.matches.iter().find(|m| m.line_number == 1).unwrap();
    assert_eq!(fox.source, "fox");
    assert_eq!(fox.source_line_number, 2);
    let ai = result.matches.iter().find(|m| m.line_number == 2).unwrap();
    assert_eq!(ai.source, "AI Essay");
    assert_eq!(ai.source_line_number, 7);
}

#[test]
fn test_checks_share_a_corpus_snapshot() {
    let mut corpus = pangram_corpus();
    let snapshot = corpus.clone();
    corpus.remove_label("Test Source");

    let lines = candidate_lines([PANGRAM]);
    let before = check_lines(&lines, &snapshot, &DetectionConfig::default());
    let after = check_lines(&lines, &corpus, &DetectionConfig::default());

    assert!(before.plagiarized);
    assert!(!after.plagiarized);
}
