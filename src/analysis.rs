//! Top-level analysis entry points.
//!
//! These tie the stages together the way a front end would: resolve the
//! upload, normalize it, send one request, and report what happened. Each
//! call is independent; nothing is cached between calls.

use crate::config::AnalyzerConfig;
use crate::document::{ArtifactKind, UploadedArtifact};
use crate::error::AnalyzerError;
use crate::output::{AnalysisOutput, AnalysisStats, DocumentInfo};
use crate::pipeline::request::Analyzer;
use crate::pipeline::{input, normalize, render};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Answer `question` about the document at `input` (local path or URL).
///
/// # Example
/// ```rust,no_run
/// use findoc_analyzer::{analyze, AnalyzerConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AnalyzerConfig::from_env()?;
/// let output = analyze("receipt.jpg", "What is the total amount due?", &config).await?;
/// println!("{}", output.answer);
/// # Ok(())
/// # }
/// ```
pub async fn analyze(
    input_str: impl AsRef<str>,
    question: &str,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let artifact =
        input::resolve_input(input_str.as_ref(), None, config.download_timeout_secs).await?;
    analyze_artifact(Some(&artifact), question, config).await
}

/// Answer `question` about an upload already held in memory.
///
/// `None` means no file was chosen and fails with
/// [`AnalyzerError::NoFileProvided`].
pub async fn analyze_artifact(
    artifact: Option<&UploadedArtifact>,
    question: &str,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(artifact.map(|a| a.name.as_str()).unwrap_or_default());
    }

    let result = run(artifact, question, config).await;

    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(output) => cb.on_analysis_complete(output.answer.len()),
            Err(e) => cb.on_analysis_error(&e.to_string()),
        }
    }
    result
}

async fn run(
    artifact: Option<&UploadedArtifact>,
    question: &str,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let total_start = Instant::now();

    // Configuration problems surface before any rendering work.
    let analyzer = Analyzer::from_config(config)?;

    // ── Step 1: Normalize ────────────────────────────────────────────────
    let normalize_start = Instant::now();
    let pages = normalize::normalize(artifact, &config.render_options()).await?;
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_pages_ready(pages.len());
    }

    // normalize() already rejected a missing artifact.
    let artifact = artifact.ok_or(AnalyzerError::NoFileProvided)?;

    // ── Step 2: Request ──────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_request_start(pages.len());
    }
    let request_start = Instant::now();
    let answer = analyzer.analyze(question, &pages).await?;
    let request_duration_ms = request_start.elapsed().as_millis() as u64;

    let stats = AnalysisStats {
        normalize_duration_ms,
        request_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Analysis of '{}' complete: {} page(s), {}ms total",
        artifact.name,
        pages.len(),
        stats.total_duration_ms
    );

    Ok(AnalysisOutput {
        answer,
        document: DocumentInfo {
            name: artifact.name.clone(),
            media_type: artifact.media_type.clone(),
            page_count: pages.len(),
            byte_len: artifact.bytes.len(),
        },
        stats,
    })
}

/// Analyse and write the answer to `output_path`.
pub async fn analyze_to_file(
    input_str: impl AsRef<str>,
    question: &str,
    output_path: impl AsRef<Path>,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    let output = analyze(input_str, question, config).await?;
    save_answer(&output.answer, output_path.as_ref()).await?;
    Ok(output)
}

/// Write an answer to disk verbatim as plain text.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn save_answer(answer: &str, path: &Path) -> Result<(), AnalyzerError> {
    let write_err = |e| AnalyzerError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, answer.as_bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Saved analysis to {}", path.display());
    Ok(())
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    question: &str,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, AnalyzerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(input_str, question, config))
}

/// Describe a document without contacting the model.
///
/// Does not require an API key.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentInfo, AnalyzerError> {
    let timeout_secs = AnalyzerConfig::default().download_timeout_secs;
    let artifact = input::resolve_input(input_str.as_ref(), None, timeout_secs).await?;
    inspect_artifact(&artifact, None).await
}

/// Describe an in-memory upload: name, media type and page count.
pub async fn inspect_artifact(
    artifact: &UploadedArtifact,
    password: Option<&str>,
) -> Result<DocumentInfo, AnalyzerError> {
    let page_count = match artifact.kind() {
        ArtifactKind::Image => 1,
        ArtifactKind::Pdf => {
            let pdf: Arc<[u8]> = Arc::from(artifact.bytes.as_slice());
            render::page_count(pdf, password.map(str::to_string)).await?
        }
        ArtifactKind::Unsupported => {
            return Err(AnalyzerError::UnsupportedFormat {
                media_type: artifact.media_type.clone(),
            })
        }
    };

    Ok(DocumentInfo {
        name: artifact.name.clone(),
        media_type: artifact.media_type.clone(),
        page_count,
        byte_len: artifact.bytes.len(),
    })
}
