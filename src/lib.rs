//! # findoc-analyzer
//!
//! Ask natural-language questions about financial documents (invoices,
//! receipts, statements, annual reports) using a multimodal model.
//!
//! ## How it works
//!
//! Scanned receipts and statement PDFs rarely carry reliable text, so this
//! crate never extracts any. Every document becomes a list of page images,
//! and one request carrying a fixed analyst prompt, those pages and the
//! user's question goes to the model. The answer comes back verbatim.
//!
//! ```text
//! upload (image / PDF)
//!  │
//!  ├─ 1. Input      read a local file or download from URL
//!  ├─ 2. Normalize  images pass through; PDF pages rasterised via pdfium
//!  ├─ 3. Request    [prompt, page_1 … page_n, question] in one call
//!  └─ 4. Output     answer text + document info + timings
//! ```
//!
//! Documents that are not financial get a fixed refusal from the model
//! (see [`NON_FINANCIAL_REFUSAL`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use findoc_analyzer::{analyze, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from GOOGLE_API_KEY (or GEMINI_API_KEY)
//!     let config = AnalyzerConfig::from_env()?;
//!     let output = analyze("statement.pdf", "What was the net income for 2023?", &config).await?;
//!     println!("{}", output.answer);
//!     eprintln!("{} page(s) in {}ms", output.document.page_count, output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `findoc` binary (clap + anyhow + tracing-subscriber) |
//!
//! ```toml
//! findoc-analyzer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{
    analyze, analyze_artifact, analyze_sync, analyze_to_file, inspect, inspect_artifact,
    save_answer,
};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use document::{download_file_name, ArtifactKind, PageImage, UploadedArtifact};
pub use error::AnalyzerError;
pub use output::{AnalysisOutput, AnalysisStats, DocumentInfo};
pub use pipeline::normalize::{normalize, normalize_blocking};
pub use pipeline::render::RenderOptions;
pub use pipeline::request::{AnalysisRequest, Analyzer};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::{DocumentType, FINANCIAL_ANALYSIS_PROMPT, NON_FINANCIAL_REFUSAL};
pub use provider::{
    ContentGenerator, ContentItem, GeminiGenerator, LlmProviderGenerator, ProviderError,
};
