//! CLI binary for receipt2csv.
//!
//! A thin shim over the library crate that maps CLI flags to `ScanConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use receipt2csv::config::{
    DEFAULT_ENDPOINT, DEFAULT_INPUT_DIR, DEFAULT_MODEL, DEFAULT_OUTPUT_PATH, DEFAULT_REFERER,
    DEFAULT_TITLE,
};
use receipt2csv::{
    default_extractor, extract_directory, CompletionError, ProgressCallback, ReceiptScanner,
    ScanConfig, ScanProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// Collapse whitespace and cut long error text so it fits one log line.
fn one_line(text: &str) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match text.char_indices().nth(100) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text,
    }
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar over the files plus one log
/// line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// When the current file started, for elapsed reporting.
    file_started: Mutex<Option<Instant>>,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing receipts…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            file_started: Mutex::new(None),
            skipped: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Scanning");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} receipts"))
        ));
    }

    fn on_file_start(&self, file: &str, _index: usize, _total: usize) {
        if let Ok(mut t) = self.file_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(file.to_string());
    }

    fn on_file_skipped(&self, file: &str, reason: Option<&str>) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        let why = one_line(reason.unwrap_or("no text"));
        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            yellow("–"),
            file,
            dim(&why),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_recorded(&self, file: &str, fields_found: usize, error: Option<&CompletionError>) {
        let (mark, detail) = match error {
            Some(CompletionError::Status { status, body }) => (
                red("✗"),
                red(&one_line(&format!("HTTP {status}: {body}, empty row"))),
            ),
            Some(e) => (red("✗"), red(&one_line(&format!("{e}, empty row")))),
            None => (green("✓"), dim(&format!("{fields_found} fields"))),
        };
        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            mark,
            file,
            detail,
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_files: usize, rows_written: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} receipts recorded{}",
            if skipped == 0 { green("✔") } else { cyan("⚠") },
            bold(&rows_written.to_string()),
            total_files,
            if skipped == 0 {
                String::new()
            } else {
                format!("  ({} skipped)", yellow(&skipped.to_string()))
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan ./assets into parsed_receipts.csv
  receipt2csv

  # Different folders
  receipt2csv -i ~/Scans/2024 -o reports/2024.csv

  # Another model
  receipt2csv --model google/gemini-2.0-flash-001

  # Check what OCR sees, without calling the API
  receipt2csv --ocr-only -i ./assets

  # Machine-readable run summary
  receipt2csv --json > summary.json

OUTPUT COLUMNS:
  File, Date, Total, Tax, Payment Method, Vendor, Receipt Number
  The header is written only when the CSV is empty. Every run appends;
  re-scanning the same folder adds duplicate rows.

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY      Completion API key (also read from ./.env)
  RECEIPT2CSV_MODEL       Override model ID
  RECEIPT2CSV_ENDPOINT    Override chat-completion URL
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory) for PDF input
  RUST_LOG                Tracing filter, e.g. receipt2csv=debug

SETUP:
  1. Install tesseract:   apt install tesseract-ocr   |  brew install tesseract
  2. For PDFs, install pdfium and set PDFIUM_LIB_PATH
  3. export OPENROUTER_API_KEY=sk-or-...
"#;

/// Extract receipt fields with OCR + an LLM and append them to a CSV.
#[derive(Parser, Debug)]
#[command(
    name = "receipt2csv",
    version,
    about = "Extract receipt fields with OCR and an LLM, appending them to a CSV",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder holding receipt images and PDFs (created if missing).
    #[arg(short, long, env = "RECEIPT2CSV_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// CSV file to append rows to.
    #[arg(short, long, env = "RECEIPT2CSV_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Completion API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Completion model ID.
    #[arg(long, env = "RECEIPT2CSV_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat-completion endpoint URL.
    #[arg(long, env = "RECEIPT2CSV_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Value of the HTTP-Referer request header.
    #[arg(long, env = "RECEIPT2CSV_REFERER", default_value = DEFAULT_REFERER)]
    referer: String,

    /// Value of the X-Title request header.
    #[arg(long, env = "RECEIPT2CSV_TITLE", default_value = DEFAULT_TITLE)]
    title: String,

    /// Text file with a custom prompt template (must contain {receipt_text}).
    #[arg(long, env = "RECEIPT2CSV_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Tesseract language(s), e.g. eng or eng+fra.
    #[arg(long, env = "RECEIPT2CSV_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Path to the tesseract executable.
    #[arg(long, env = "RECEIPT2CSV_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Per-request API timeout in seconds (default: none).
    #[arg(long, env = "RECEIPT2CSV_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Print OCR text per file; no API calls, no CSV.
    #[arg(long)]
    ocr_only: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RECEIPT2CSV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal; anything else is worth knowing about.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("{} ignoring .env: {e}", yellow("⚠"));
        }
    }

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar reports per-file results, completion status and body
    // included, so INFO and WARN logs would only duplicate it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.ocr_only;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ScanProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── OCR-only mode ────────────────────────────────────────────────────
    if cli.ocr_only {
        let extractor = default_extractor(&config);
        let files = extract_directory(&config, &extractor)
            .await
            .context("OCR pass failed")?;
        for f in files {
            println!("{}", bold(&format!("── {} ──", f.file_name)));
            match f.text {
                Ok(text) if text.is_empty() => println!("{}", dim("(no text)")),
                Ok(text) => println!("{text}"),
                Err(e) => println!("{}", red(&e.to_string())),
            }
            println!();
        }
        return Ok(());
    }

    // ── Run scan ─────────────────────────────────────────────────────────
    let scanner = ReceiptScanner::from_config(config).context("Cannot start scan")?;
    let summary = scanner.run().await.context("Scan failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Recorded {}/{} receipts in {}ms  →  {}",
            summary.stats.rows_written,
            summary.stats.files_seen,
            summary.stats.duration_ms,
            cli.output.display(),
        );
        if summary.stats.completion_failures > 0 {
            eprintln!(
                "  {} rows written with empty fields (API failure)",
                summary.stats.completion_failures
            );
        }
    } else if !cli.quiet {
        eprintln!("   →  {}", bold(&cli.output.display().to_string()));
    }

    Ok(())
}

/// Map CLI args to `ScanConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder()
        .input_dir(&cli.input_dir)
        .output_path(&cli.output)
        .model_id(&cli.model)
        .endpoint(&cli.endpoint)
        .referer(&cli.referer)
        .title(&cli.title)
        .ocr_language(&cli.ocr_lang)
        .tesseract_path(&cli.tesseract);

    if let Some(ref path) = cli.prompt_file {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
