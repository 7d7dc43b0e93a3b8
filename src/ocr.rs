//! OCR extraction for PDFs without a usable text layer.
//!
//! Each page is rasterized at a high DPI, preprocessed (grayscale plus a
//! contrast boost to improve glyph separation), and fed to tesseract with a
//! fixed language pack and automatic layout segmentation.
//!
//! The tesseract bindings require exclusive ownership of the recognition
//! handle and the handle is not Send, so a fresh handle is built inside each
//! blocking task. Language-data availability is probed once at construction;
//! a missing language pack is fatal at startup, not per-request. A semaphore
//! bounds concurrent OCR jobs since recognition is CPU-heavy.

use std::sync::Arc;

use image::DynamicImage;
use tesseract::{PageSegMode, Tesseract};
use tokio::sync::Semaphore;

use crate::config::{PageFailurePolicy, PipelineConfig};
use crate::error::OcrError;
use crate::pdf;

/// Contrast boost applied after grayscale conversion, before recognition.
const OCR_CONTRAST_BOOST: f32 = 20.0;

/// OCR engine over rasterized PDF pages.
pub struct OcrEngine {
    languages: String,
    tessdata_path: Option<String>,
    dpi: u16,
    page_failure_policy: PageFailurePolicy,
    jobs: Arc<Semaphore>,
}

impl OcrEngine {
    /// Create an OCR engine, probing that the configured language data can
    /// actually be loaded.
    ///
    /// Fails with [`OcrError::Init`] when the language pack is missing —
    /// callers should treat that as the OCR capability being unavailable
    /// rather than retrying per request.
    pub fn new(config: &PipelineConfig) -> Result<Self, OcrError> {
        let probe = Tesseract::new(
            config.tessdata_path.as_deref(),
            Some(&config.ocr_languages),
        )
        .map_err(|e| OcrError::Init {
            languages: config.ocr_languages.clone(),
            reason: e.to_string(),
        })?;
        drop(probe);

        tracing::info!(languages = %config.ocr_languages, "OCR engine initialized");

        Ok(Self {
            languages: config.ocr_languages.clone(),
            tessdata_path: config.tessdata_path.clone(),
            dpi: config.ocr_dpi,
            page_failure_policy: config.page_failure_policy,
            jobs: Arc::new(Semaphore::new(1)),
        })
    }

    /// OCR up to `max_pages` pages of a PDF, concatenating per-page text.
    pub async fn extract_via_ocr(
        &self,
        pdf_bytes: Vec<u8>,
        max_pages: u16,
    ) -> Result<String, OcrError> {
        // Serializes recognition; the semaphore lives as long as the engine.
        let _permit = self
            .jobs
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| OcrError::Recognition {
                reason: format!("recognition queue unavailable: {}", e),
            })?;

        let languages = self.languages.clone();
        let tessdata_path = self.tessdata_path.clone();
        let dpi = self.dpi;
        let policy = self.page_failure_policy;

        tokio::task::spawn_blocking(move || {
            ocr_document_blocking(
                &pdf_bytes,
                max_pages,
                dpi,
                &languages,
                tessdata_path.as_deref(),
                policy,
            )
        })
        .await?
    }
}

fn ocr_document_blocking(
    pdf_bytes: &[u8],
    max_pages: u16,
    dpi: u16,
    languages: &str,
    tessdata_path: Option<&str>,
    policy: PageFailurePolicy,
) -> Result<String, OcrError> {
    let page_count = page_count(pdf_bytes)?.min(max_pages);
    let mut result = String::new();

    for page in 0..page_count {
        match ocr_page_blocking(pdf_bytes, page, dpi, languages, tessdata_path) {
            Ok(text) => {
                result.push_str(&text);
                result.push('\n');
                tracing::debug!(page, chars = text.len(), "page recognized");
            }
            Err(e) => match policy {
                PageFailurePolicy::SkipAndLog => {
                    tracing::warn!(page, error = %e, "skipping page after OCR failure");
                }
                PageFailurePolicy::Abort => {
                    return Err(OcrError::PageFailed {
                        page,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    Ok(result)
}

fn page_count(pdf_bytes: &[u8]) -> Result<u16, OcrError> {
    let pdfium = pdf::bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| crate::error::PdfError::RenderFailure {
            reason: format!("failed to open document: {}", e),
        })?;
    Ok(document.pages().len())
}

fn ocr_page_blocking(
    pdf_bytes: &[u8],
    page: u16,
    dpi: u16,
    languages: &str,
    tessdata_path: Option<&str>,
) -> Result<String, OcrError> {
    let rendered = pdf::render_page_blocking(pdf_bytes, i32::from(page), dpi)?;
    let png = preprocess_for_ocr(rendered)?;

    let mut engine = Tesseract::new(tessdata_path, Some(languages))
        .map_err(|e| OcrError::Recognition {
            reason: format!("engine construction failed: {}", e),
        })?
        .set_image_from_mem(&png)
        .map_err(|e| OcrError::Recognition {
            reason: format!("failed to load page image: {}", e),
        })?;
    engine.set_page_seg_mode(PageSegMode::PsmAuto);

    let mut engine = engine.recognize().map_err(|e| OcrError::Recognition {
        reason: e.to_string(),
    })?;
    engine.get_text().map_err(|e| OcrError::Recognition {
        reason: e.to_string(),
    })
}

/// Grayscale + contrast boost, PNG-encoded for tesseract.
fn preprocess_for_ocr(rendered: image::RgbaImage) -> Result<Vec<u8>, OcrError> {
    let processed = DynamicImage::ImageRgba8(rendered)
        .grayscale()
        .adjust_contrast(OCR_CONTRAST_BOOST);
    let png = crate::pdf::encode_png(&processed.into_rgba8())?;
    Ok(png)
}
