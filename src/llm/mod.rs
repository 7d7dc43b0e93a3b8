//! Generative-model integration.
//!
//! The pipelines only need one capability from a model vendor: prompt text
//! in, response text out. [`TextCompletion`] is that seam; [`GeminiProvider`]
//! implements it against the Google Generative Language REST API.
//!
//! Model output is untrusted. Responses that should be JSON frequently come
//! back wrapped in markdown code fences; [`strip_markdown_fences`] normalizes
//! them before any parsing.

mod gemini;
mod response;

use async_trait::async_trait;

use crate::error::LlmError;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use response::strip_markdown_fences;

/// Text-completion capability consumed by the analysis pipelines.
///
/// Implementations must accept prompts of at least tens of thousands of
/// characters (full book text is embedded in analysis prompts).
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Send a single prompt and return the model's raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider name for logging and error reporting.
    fn name(&self) -> &str;
}
