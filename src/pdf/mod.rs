//! PDF handling: page rendering and native text-layer extraction.
//!
//! All pdfium work happens inside `spawn_blocking` — the pdfium bindings are
//! not thread-safe and every call opens its own short-lived document handle
//! over the input byte buffer. No handle outlives the call that opened it.

mod render;
mod text;
mod validity;

pub use render::PageRenderer;
pub use text::DirectTextExtractor;
pub use validity::{TextValidity, DEFAULT_MIN_WORDS};

pub(crate) use render::{encode_png, render_page_blocking};

use pdfium_render::prelude::*;

use crate::error::PdfError;

/// Bind to the pdfium shared library.
///
/// Searches the current directory first, then the system library paths.
pub(crate) fn bind_pdfium() -> Result<Pdfium, PdfError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PdfError::RenderFailure {
            reason: format!("failed to load pdfium library: {}", e),
        })?;
    Ok(Pdfium::new(bindings))
}
