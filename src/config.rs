//! Pipeline configuration.
//!
//! All values have sensible defaults; environment variables override them.
//! Call [`PipelineConfig::from_env`] once at startup (it loads `.env` via
//! dotenvy first) or build a config programmatically for tests.

use crate::error::ConfigError;

/// What to do when a single page fails to render or recognize during OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFailurePolicy {
    /// Skip the failing page, log a warning, and continue with the rest.
    SkipAndLog,
    /// Abort the whole document on the first failing page.
    Abort,
}

/// Configuration for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of pages fed into extraction and OCR per request.
    pub max_pages: u16,
    /// DPI used when rasterizing pages for OCR.
    pub ocr_dpi: u16,
    /// DPI used for first-page preview rendering.
    pub preview_dpi: u16,
    /// Minimum count of word tokens (length >= 3) for text to be analysis-ready.
    pub validity_min_words: usize,
    /// Tesseract language pack combination, e.g. "ukr+eng".
    pub ocr_languages: String,
    /// Directory containing tesseract language data, or None for the system default.
    pub tessdata_path: Option<String>,
    /// Per-page OCR failure handling.
    pub page_failure_policy: PageFailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            ocr_dpi: 200,
            preview_dpi: 50,
            validity_min_words: 50,
            ocr_languages: "ukr+eng".to_string(),
            tessdata_path: None,
            page_failure_policy: PageFailurePolicy::SkipAndLog,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `TOMESCAN_MAX_PAGES`, `TOMESCAN_OCR_DPI`,
    /// `TOMESCAN_PREVIEW_DPI`, `TOMESCAN_VALIDITY_MIN_WORDS`,
    /// `TOMESCAN_OCR_LANGUAGES`, `TOMESCAN_TESSDATA_PATH`,
    /// `TOMESCAN_PAGE_FAILURE_POLICY` (`skip` or `abort`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(v) = env_parsed::<u16>("TOMESCAN_MAX_PAGES")? {
            config.max_pages = v;
        }
        if let Some(v) = env_parsed::<u16>("TOMESCAN_OCR_DPI")? {
            config.ocr_dpi = v;
        }
        if let Some(v) = env_parsed::<u16>("TOMESCAN_PREVIEW_DPI")? {
            config.preview_dpi = v;
        }
        if let Some(v) = env_parsed::<usize>("TOMESCAN_VALIDITY_MIN_WORDS")? {
            config.validity_min_words = v;
        }
        if let Ok(v) = std::env::var("TOMESCAN_OCR_LANGUAGES") {
            if !v.is_empty() {
                config.ocr_languages = v;
            }
        }
        if let Ok(v) = std::env::var("TOMESCAN_TESSDATA_PATH") {
            if !v.is_empty() {
                config.tessdata_path = Some(v);
            }
        }
        if let Ok(v) = std::env::var("TOMESCAN_PAGE_FAILURE_POLICY") {
            config.page_failure_policy = match v.to_lowercase().as_str() {
                "skip" | "skip_and_log" => PageFailurePolicy::SkipAndLog,
                "abort" => PageFailurePolicy::Abort,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "TOMESCAN_PAGE_FAILURE_POLICY".to_string(),
                        message: format!("unknown policy '{}', expected 'skip' or 'abort'", other),
                    });
                }
            };
        }

        Ok(config)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.parse::<T>().map(Some).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("could not parse '{}'", v),
        }),
        _ => Ok(None),
    }
}
