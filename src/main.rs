//! PDF Plagiarism Server - Entry point
//!
//! An MCP server that checks PDFs for plagiarism against known sources.

use pdf_plagiarism_server::{run_server_with_config, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_plagiarism_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        mode = ?config.detection.mode,
        high_threshold = config.detection.high_threshold,
        corpus_patterns = config.corpus_paths.len(),
        "Starting PDF Plagiarism Server"
    );

    run_server_with_config(config).await
}
