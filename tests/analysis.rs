//! Offline integration tests: normalize real PDFs and run full analyses
//! against a recording generator.
//!
//! Tests that rasterise PDFs need a pdfium library (`PDFIUM_LIB_PATH`, `./`
//! or the system path) and print `SKIP` without one. CI downloads a prebuilt
//! libpdfium (bblanchon/pdfium-binaries), exports its path as
//! `PDFIUM_LIB_PATH` and sets `FINDOC_REQUIRE_PDFIUM=1`, which turns every
//! skip into a failure:
//!
//!   PDFIUM_LIB_PATH=/opt/pdfium/lib/libpdfium.so FINDOC_REQUIRE_PDFIUM=1 \
//!     cargo test --test analysis

#[macro_use]
mod common;

use common::{pdf_with_pages, png_fixture, RecordingGenerator, LANDSCAPE, PORTRAIT};
use findoc_analyzer::{
    analyze, analyze_artifact, analyze_to_file, inspect, normalize, normalize_blocking,
    AnalysisProgressCallback, AnalyzerConfig, AnalyzerError, ContentItem, RenderOptions,
    UploadedArtifact, FINANCIAL_ANALYSIS_PROMPT,
};
use std::sync::{Arc, Mutex};

fn config_with(generator: Arc<RecordingGenerator>) -> AnalyzerConfig {
    AnalyzerConfig::builder().generator(generator).build().unwrap()
}

fn decoded_dims(png: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(png).expect("rendered page should be a valid PNG");
    (img.width(), img.height())
}

// ── Normalizer ───────────────────────────────────────────────────────────────

#[test]
fn pdfium_is_bound_when_required() {
    skip_without_pdfium!();
    assert!(findoc_analyzer::pipeline::render::bind_pdfium().is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn pdf_pages_become_pngs_in_order() {
    skip_without_pdfium!();

    let pdf = pdf_with_pages(&[PORTRAIT, LANDSCAPE, PORTRAIT]);
    let artifact = UploadedArtifact::new("application/pdf", pdf, "statement.pdf");

    let pages = normalize(Some(&artifact), &RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(pages.len(), 3);

    let shapes: Vec<bool> = pages
        .iter()
        .map(|p| {
            assert_eq!(p.media_type, "image/png");
            let (w, h) = decoded_dims(&p.data);
            assert!(w.max(h) <= 2000, "page exceeds cap: {w}x{h}");
            w > h
        })
        .collect();
    assert_eq!(shapes, vec![false, true, false], "pages out of order");
}

#[tokio::test(flavor = "multi_thread")]
async fn max_rendered_pixels_caps_longest_edge() {
    skip_without_pdfium!();

    let pdf = pdf_with_pages(&[PORTRAIT]);
    let artifact = UploadedArtifact::new("application/pdf", pdf, "one.pdf");
    let options = RenderOptions {
        max_rendered_pixels: 400,
        password: None,
    };

    let pages = normalize(Some(&artifact), &options).await.unwrap();
    let (w, h) = decoded_dims(&pages[0].data);
    assert!(h <= 400 && w <= 400, "got {w}x{h}");
}

#[test]
fn normalizing_twice_gives_identical_pages() {
    skip_without_pdfium!();

    let pdf = pdf_with_pages(&[PORTRAIT, LANDSCAPE]);
    let artifact = UploadedArtifact::new("application/pdf", pdf, "twice.pdf");
    let first = normalize_blocking(Some(&artifact), &RenderOptions::default()).unwrap();
    let second = normalize_blocking(Some(&artifact), &RenderOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_pdf_is_a_processing_failure() {
    skip_without_pdfium!();

    let artifact = UploadedArtifact::new(
        "application/pdf",
        b"%PDF-1.4\nthis is not really a pdf".to_vec(),
        "broken.pdf",
    );
    let err = normalize(Some(&artifact), &RenderOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_processing_failure(), "got {err:?}");
    assert!(err.hint().unwrap().contains("PDF"));
}

// ── Full analysis ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn pdf_request_is_prompt_pages_question() {
    skip_without_pdfium!();

    let fake = RecordingGenerator::answering("Net income was $1.2M.");
    let config = config_with(fake.clone());
    let pdf = pdf_with_pages(&[PORTRAIT, PORTRAIT]);
    let artifact = UploadedArtifact::new("application/pdf", pdf, "q4-statement.pdf");

    let output = analyze_artifact(Some(&artifact), "What was the net income?", &config)
        .await
        .unwrap();

    assert_eq!(output.answer, "Net income was $1.2M.");
    assert_eq!(output.document.page_count, 2);
    assert_eq!(output.download_file_name(), "q4-statement_financial_analysis.txt");

    assert_eq!(fake.call_count(), 1);
    let items = fake.last_call();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0], ContentItem::text(FINANCIAL_ANALYSIS_PROMPT));
    assert!(items[1..3]
        .iter()
        .all(|i| i.as_image().is_some_and(|p| p.media_type == "image/png")));
    assert_eq!(items[3], ContentItem::text("What was the net income?"));
}

#[tokio::test]
async fn image_request_sends_original_bytes() {
    let fake = RecordingGenerator::answering("Total: $42.17");
    let config = config_with(fake.clone());
    let png = png_fixture(40, 80);
    let artifact = UploadedArtifact::new("image/png", png.clone(), "receipt.png");

    let output = analyze_artifact(Some(&artifact), "What is the total?", &config)
        .await
        .unwrap();
    assert_eq!(output.answer, "Total: $42.17");
    assert_eq!(output.document.byte_len, png.len());

    let items = fake.last_call();
    assert_eq!(items.len(), 3);
    let page = items[1].as_image().unwrap();
    assert_eq!(page.media_type, "image/png");
    assert_eq!(page.data, png);
}

#[tokio::test]
async fn missing_file_never_calls_the_model() {
    let fake = RecordingGenerator::answering("unused");
    let config = config_with(fake.clone());

    let err = analyze_artifact(None, "Total?", &config).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::NoFileProvided));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn unsupported_upload_never_calls_the_model() {
    let fake = RecordingGenerator::answering("unused");
    let config = config_with(fake.clone());
    let artifact = UploadedArtifact::new("text/plain", b"revenue,100".to_vec(), "data.txt");

    let err = analyze_artifact(Some(&artifact), "Total?", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::UnsupportedFormat { .. }));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn remote_failure_carries_message_and_is_not_retried() {
    let fake = RecordingGenerator::failing("API key not valid");
    let config = config_with(fake.clone());
    let artifact = UploadedArtifact::new("image/jpeg", vec![0xFF, 0xD8], "r.jpg");

    let err = analyze_artifact(Some(&artifact), "Total?", &config)
        .await
        .unwrap_err();
    match &err {
        AnalyzerError::RemoteAnalysisFailure { message } => {
            assert!(message.contains("API key not valid"), "got: {message}")
        }
        other => panic!("expected RemoteAnalysisFailure, got {other:?}"),
    }
    assert!(err.hint().is_some());
    assert_eq!(fake.call_count(), 1);
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl AnalysisProgressCallback for RecordingProgress {
    fn on_analysis_start(&self, document_name: &str) {
        self.events.lock().unwrap().push(format!("start {document_name}"));
    }
    fn on_pages_ready(&self, page_count: usize) {
        self.events.lock().unwrap().push(format!("pages {page_count}"));
    }
    fn on_request_start(&self, page_count: usize) {
        self.events.lock().unwrap().push(format!("request {page_count}"));
    }
    fn on_analysis_complete(&self, answer_len: usize) {
        self.events.lock().unwrap().push(format!("done {answer_len}"));
    }
    fn on_analysis_error(&self, _error: &str) {
        self.events.lock().unwrap().push("error".into());
    }
}

#[tokio::test]
async fn progress_events_arrive_in_order() {
    let progress = Arc::new(RecordingProgress::default());
    let config = AnalyzerConfig::builder()
        .generator(RecordingGenerator::answering("four"))
        .progress_callback(progress.clone())
        .build()
        .unwrap();
    let artifact = UploadedArtifact::new("image/png", png_fixture(4, 4), "tiny.png");

    analyze_artifact(Some(&artifact), "q", &config).await.unwrap();
    assert_eq!(
        *progress.events.lock().unwrap(),
        vec!["start tiny.png", "pages 1", "request 1", "done 4"]
    );

    analyze_artifact(None, "q", &config).await.unwrap_err();
    assert_eq!(progress.events.lock().unwrap().last().unwrap(), "error");
}

// ── Files on disk ────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_reads_local_file_and_guesses_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.png");
    std::fs::write(&path, png_fixture(10, 20)).unwrap();

    let fake = RecordingGenerator::answering("Tax: $3.10");
    let output = analyze(path.to_str().unwrap(), "Calculate the tax amount", &config_with(fake.clone()))
        .await
        .unwrap();

    assert_eq!(output.document.name, "receipt.png");
    assert_eq!(output.document.media_type, "image/png");
    assert_eq!(output.answer, "Tax: $3.10");
}

#[tokio::test]
async fn analyze_to_file_writes_answer_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("invoice.png");
    std::fs::write(&input, png_fixture(10, 10)).unwrap();
    let out = dir.path().join("exports/invoice_financial_analysis.txt");

    let answer = "Amount due: $980.00\nDue date: 2024-07-01\n";
    let fake = RecordingGenerator::answering(answer);
    analyze_to_file(input.to_str().unwrap(), "When is this invoice due?", &out, &config_with(fake))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), answer);
}

#[tokio::test]
async fn missing_local_file_is_reported() {
    let fake = RecordingGenerator::answering("unused");
    let err = analyze("/definitely/not/here.pdf", "q", &config_with(fake.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::FileNotFound { .. }), "got {err:?}");
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn inspect_counts_pdf_pages() {
    skip_without_pdfium!();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, pdf_with_pages(&[PORTRAIT; 5])).unwrap();

    let info = inspect(path.to_str().unwrap()).await.unwrap();
    assert_eq!(info.page_count, 5);
    assert_eq!(info.media_type, "application/pdf");
}
