//! Native text-layer extraction.

use crate::error::PdfError;
use crate::pdf::bind_pdfium;

/// Extracts embedded (searchable) text from a PDF without rasterizing.
///
/// Pure function of the input bytes and page budget. A document without a
/// text layer yields an empty string, which is an expected outcome — the
/// orchestrator decides whether to fall back to OCR.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTextExtractor;

impl DirectTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text layer of up to `max_pages` pages.
    pub async fn extract(&self, pdf_bytes: Vec<u8>, max_pages: u16) -> Result<String, PdfError> {
        tokio::task::spawn_blocking(move || extract_text_blocking(&pdf_bytes, max_pages)).await?
    }
}

fn extract_text_blocking(pdf_bytes: &[u8], max_pages: u16) -> Result<String, PdfError> {
    let pdfium = bind_pdfium()?;
    let document =
        pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| PdfError::RenderFailure {
                reason: format!("failed to open document: {}", e),
            })?;

    let pages = document.pages();
    let page_count = pages.len().min(max_pages);
    let mut result = String::new();

    for (index, page) in pages.iter().take(usize::from(page_count)).enumerate() {
        // Pages without a text object simply contribute nothing.
        let text = page.text().map(|t| t.all()).unwrap_or_default();
        if !text.is_empty() {
            result.push_str(&text);
            result.push('\n');
        }
        tracing::trace!(page = index, chars = text.len(), "text layer extracted");
    }

    Ok(result)
}
