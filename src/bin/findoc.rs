//! CLI binary for findoc-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalyzerConfig` and prints the model's answer.

use anyhow::{Context, Result};
use clap::Parser;
use findoc_analyzer::pipeline::input::resolve_input;
use findoc_analyzer::{
    analyze_artifact, inspect_artifact, save_answer, AnalysisProgressCallback, AnalyzerConfig,
    AnalyzerError, DocumentType, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the analysis through its stages.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Set when the request is sent, for the elapsed-time line.
    request_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            request_started: Mutex::new(None),
        })
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, document_name: &str) {
        self.bar.set_prefix("Preparing");
        self.bar.set_message(format!("Processing {document_name}…"));
    }

    fn on_pages_ready(&self, page_count: usize) {
        self.bar.println(format!(
            "  {} {} ready",
            green("✓"),
            if page_count == 1 {
                "1 page".to_string()
            } else {
                format!("{page_count} pages")
            }
        ));
    }

    fn on_request_start(&self, _page_count: usize) {
        if let Ok(mut started) = self.request_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_prefix("Analyzing");
        self.bar.set_message("Analyzing document…");
    }

    fn on_analysis_complete(&self, answer_len: usize) {
        let elapsed_ms = self
            .request_started
            .lock()
            .ok()
            .and_then(|s| *s)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        self.bar.finish_and_clear();
        eprintln!(
            "{} Analysis complete  {}  {}",
            green("✔"),
            dim(&format!("{answer_len} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        );
    }

    fn on_analysis_error(&self, _error: &str) {
        // main() prints the error and its hint.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ask about a receipt
  findoc receipt.jpg -Q "What is the total amount due?"

  # Multi-page statement, answer saved as statement_financial_analysis.txt
  findoc statement.pdf -Q "Calculate the debt-to-equity ratio" --save

  # Analyse a document from a URL
  findoc https://example.com/annual-report.pdf -Q "What was the net profit margin?"

  # Page count and media type only (no API key needed)
  findoc --inspect-only statement.pdf

  # Example questions for a document type
  findoc --examples --doc-type invoice statement.pdf

  # JSON output with document info and timings
  findoc --json receipt.png -Q "Calculate the tax amount" > answer.json

SUPPORTED FORMATS:
  JPG, JPEG, PNG (sent as-is), PDF (every page rendered to PNG)

ENVIRONMENT VARIABLES:
  GOOGLE_API_KEY      Google Gemini API key (GEMINI_API_KEY also accepted)
  FINDOC_MODEL        Override model ID (default gemini-1.5-flash)
  FINDOC_PROVIDER     Use another edgequake-llm provider (openai, anthropic, ollama, …)
  PDFIUM_LIB_PATH     Path to libpdfium, if not installed system-wide
  RUST_LOG            Override log filter

  Variables may also be placed in a .env file in the working directory.
"#;

/// Ask questions about financial documents using a multimodal model.
#[derive(Parser, Debug)]
#[command(
    name = "findoc",
    version,
    about = "Ask questions about invoices, receipts and financial statements",
    long_about = "Answer natural-language questions about financial documents (images or PDFs) \
using a multimodal model. Every PDF page is rendered to an image and sent together with a fixed \
analyst prompt and your question in a single request.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image/PDF path or HTTP/HTTPS URL.
    input: String,

    /// Question about the document, sent verbatim.
    #[arg(short = 'Q', long, env = "FINDOC_QUESTION", default_value = "")]
    question: String,

    /// Declared media type (e.g. image/png, application/pdf). Guessed when absent.
    #[arg(long, env = "FINDOC_MEDIA_TYPE")]
    media_type: Option<String>,

    /// Model ID (default gemini-1.5-flash).
    #[arg(long, env = "FINDOC_MODEL")]
    model: Option<String>,

    /// Provider: gemini (default) or any edgequake-llm provider name.
    #[arg(long, env = "FINDOC_PROVIDER")]
    provider: Option<String>,

    /// Kind of document, used to pick example questions.
    #[arg(long, env = "FINDOC_DOC_TYPE", value_enum, default_value = "auto")]
    doc_type: DocTypeArg,

    /// Print example questions for --doc-type and exit.
    #[arg(long)]
    examples: bool,

    /// Cap on the longer side of a rendered PDF page, in pixels.
    #[arg(long, env = "FINDOC_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "FINDOC_PASSWORD")]
    password: Option<String>,

    /// Model request timeout in seconds.
    #[arg(long, env = "FINDOC_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "FINDOC_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Write the answer to this file.
    #[arg(short, long, env = "FINDOC_OUTPUT", conflicts_with = "save")]
    output: Option<PathBuf>,

    /// Write the answer to `<name>_financial_analysis.txt` in the current directory.
    #[arg(long)]
    save: bool,

    /// Output structured JSON (AnalysisOutput) instead of the bare answer.
    #[arg(long, env = "FINDOC_JSON")]
    json: bool,

    /// Print document info only, no analysis.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FINDOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the answer and errors.
    #[arg(short, long, env = "FINDOC_QUIET")]
    quiet: bool,

    /// Disable the spinner.
    #[arg(long, env = "FINDOC_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DocTypeArg {
    Auto,
    Invoice,
    Statement,
    AnnualReport,
    Other,
}

impl From<DocTypeArg> for DocumentType {
    fn from(v: DocTypeArg) -> Self {
        match v {
            DocTypeArg::Auto => DocumentType::AutoDetect,
            DocTypeArg::Invoice => DocumentType::InvoiceOrReceipt,
            DocTypeArg::Statement => DocumentType::FinancialStatement,
            DocTypeArg::AnnualReport => DocumentType::AnnualReport,
            DocTypeArg::Other => DocumentType::Other,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads `env = …` defaults.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("✘"), e);
            if let Some(hint) = e.downcast_ref::<AnalyzerError>().and_then(|e| e.hint()) {
                eprintln!("  {}", dim(&hint));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let doc_type: DocumentType = cli.doc_type.into();

    // ── Example questions ────────────────────────────────────────────────
    if cli.examples {
        print_examples(doc_type);
        return Ok(());
    }

    // ── Credential check ─────────────────────────────────────────────────
    // Fatal at startup rather than after a document has been processed.
    let api_key = match AnalyzerConfig::from_env() {
        Ok(c) => c.api_key,
        Err(e) if !cli.inspect_only && uses_gemini(cli) => return Err(e.into()),
        Err(_) => None,
    };

    // ── Resolve input ────────────────────────────────────────────────────
    let artifact = resolve_input(&cli.input, cli.media_type.as_deref(), cli.download_timeout)
        .await
        .context("Failed to read document")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect_artifact(&artifact, cli.password.as_deref()).await?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize document info")?
            );
        } else {
            println!("File:         {}", info.name);
            println!("Media type:   {}", info.media_type);
            println!("Pages:        {}", info.page_count);
            println!("Size:         {} bytes", info.byte_len);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, api_key, progress_cb)?;

    if !cli.quiet && !cli.json && cli.question.trim().is_empty() {
        eprintln!(
            "{} {}",
            cyan("⚠"),
            dim("No question given (-Q). Sending the document with an empty question.")
        );
    }

    // ── Run analysis ─────────────────────────────────────────────────────
    let output = analyze_artifact(Some(&artifact), &cli.question, &config).await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.answer.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.answer.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Export ───────────────────────────────────────────────────────────
    let export_path = match (&cli.output, cli.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(output.download_file_name())),
        (None, false) => None,
    };
    if let Some(path) = export_path {
        save_answer(&output.answer, &path).await?;
        if !cli.quiet {
            eprintln!(
                "{}  saved  →  {}",
                green("✔"),
                bold(&path.display().to_string())
            );
        }
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "Analyzed {} page(s) in {}ms ({}ms rendering, {}ms model)",
            output.document.page_count,
            output.stats.total_duration_ms,
            output.stats.normalize_duration_ms,
            output.stats.request_duration_ms
        );
    }

    Ok(())
}

fn uses_gemini(cli: &Cli) -> bool {
    cli.provider
        .as_deref()
        .is_none_or(|p| p.eq_ignore_ascii_case("gemini"))
}

fn print_examples(doc_type: DocumentType) {
    let questions = doc_type.example_questions();
    if questions.is_empty() {
        println!(
            "No example questions for {}. Try --doc-type invoice or --doc-type statement.",
            doc_type.label()
        );
        return;
    }
    println!("{}", bold(&format!("Example questions for {}:", doc_type.label())));
    for q in questions {
        println!("  • {q}");
    }
}

/// Map CLI args to `AnalyzerConfig`.
fn build_config(
    cli: &Cli,
    api_key: Option<String>,
    progress: Option<ProgressCallback>,
) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .max_rendered_pixels(cli.max_pixels)
        .request_timeout_secs(cli.timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
