//! Error types for the ingestion pipeline.

/// Top-level error type for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// PDF rendering and text-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: i32, page_count: u16 },

    #[error("Failed to render PDF: {reason}")]
    RenderFailure { reason: String },

    #[error("Failed to encode rendered page: {reason}")]
    Encode { reason: String },

    #[error("Failed to join render task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// OCR backend errors.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine initialization failed (languages '{languages}'): {reason}")]
    Init { languages: String, reason: String },

    #[error("OCR recognition failed: {reason}")]
    Recognition { reason: String },

    #[error("OCR failed on page {page}: {reason}")]
    PageFailed { page: u16, reason: String },

    #[error("PDF error during OCR: {0}")]
    Pdf(#[from] PdfError),

    #[error("Failed to join OCR task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Text-extraction orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Insufficient extractable text: both direct extraction and OCR fell below the validity threshold")]
    InsufficientText,

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),
}

/// Generative-model provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Catalog lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog query failed: {reason}")]
    QueryFailed { reason: String },
}

/// Errors from the analysis pipelines.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to parse model response as {expected}: {reason}")]
    ResponseParse { expected: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
