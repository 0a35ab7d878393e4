//! Configuration types for a receipt scan run.
//!
//! All run behaviour is controlled through [`ScanConfig`], built via its
//! [`ScanConfigBuilder`]. The input folder, output file, credential, model and
//! prompt template used to be process-wide constants; here they travel in one
//! struct that is handed to the orchestrator at construction.

use crate::error::ReceiptError;
use crate::progress::ProgressCallback;
use crate::prompts::{DEFAULT_PROMPT_TEMPLATE, RECEIPT_TEXT_PLACEHOLDER};
use std::fmt;
use std::path::PathBuf;

/// Default folder scanned for receipts.
pub const DEFAULT_INPUT_DIR: &str = "./assets";

/// Default CSV destination.
pub const DEFAULT_OUTPUT_PATH: &str = "parsed_receipts.csv";

/// Default OpenRouter chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "mistralai/mixtral-8x7b";

/// Default `HTTP-Referer` header sent with each completion request.
pub const DEFAULT_REFERER: &str = "https://github.com/receipt2csv";

/// Default `X-Title` header sent with each completion request.
pub const DEFAULT_TITLE: &str = "ReceiptParser";

/// Configuration for a receipt scan.
///
/// Built via [`ScanConfig::builder()`] or using [`ScanConfig::default()`].
///
/// # Example
/// ```rust
/// use receipt2csv::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .input_dir("./scans")
///     .output_path("out/receipts.csv")
///     .api_key("sk-or-...")
///     .build()
///     .unwrap();
/// assert_eq!(config.model_id, "mistralai/mixtral-8x7b");
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// Folder whose regular files are treated as receipts. Created if absent.
    pub input_dir: PathBuf,

    /// CSV file rows are appended to.
    pub output_path: PathBuf,

    /// Bearer credential for the completion endpoint.
    ///
    /// Never hardcoded: the CLI reads it from `OPENROUTER_API_KEY` (or `.env`).
    /// Only required when the default HTTP completer is constructed.
    pub api_key: Option<String>,

    /// Model identifier sent in the request body.
    pub model_id: String,

    /// Prompt template; must contain `{receipt_text}`.
    pub prompt_template: String,

    /// Chat-completion URL.
    pub endpoint: String,

    /// Value of the `HTTP-Referer` header.
    pub referer: String,

    /// Value of the `X-Title` header.
    pub title: String,

    /// Tesseract language code(s), e.g. `eng` or `eng+fra`. Default: `eng`.
    pub ocr_language: String,

    /// Path to the `tesseract` executable. Default: looked up on `PATH`.
    pub tesseract_path: PathBuf,

    /// Longest edge of a rasterised PDF page in pixels. Default: 2000.
    ///
    /// Tesseract reads receipt print comfortably at this size; larger pages
    /// cost memory without improving recognition.
    pub max_rendered_pixels: u32,

    /// Per-request timeout in seconds. Default: none (client default).
    pub api_timeout_secs: Option<u64>,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            api_key: None,
            model_id: DEFAULT_MODEL.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
            ocr_language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            max_rendered_pixels: 2000,
            api_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("input_dir", &self.input_dir)
            .field("output_path", &self.output_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_id", &self.model_id)
            .field("endpoint", &self.endpoint)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_path", &self.tesseract_path)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.config.model_id = model.into();
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = template.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.config.referer = referer.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, ReceiptError> {
        let c = &self.config;
        if !c.prompt_template.contains(RECEIPT_TEXT_PLACEHOLDER) {
            return Err(ReceiptError::InvalidConfig(format!(
                "prompt template must contain the {} placeholder",
                RECEIPT_TEXT_PLACEHOLDER
            )));
        }
        if c.model_id.trim().is_empty() {
            return Err(ReceiptError::InvalidConfig("model id is empty".into()));
        }
        if !(c.endpoint.starts_with("https://") || c.endpoint.starts_with("http://")) {
            return Err(ReceiptError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ReceiptError::InvalidConfig("OCR language is empty".into()));
        }
        Ok(self.config)
    }
}
