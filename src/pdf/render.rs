//! Single-page PDF rasterization.

use image::RgbaImage;
use pdfium_render::prelude::*;

use crate::error::PdfError;
use crate::pdf::bind_pdfium;

// Target dimensions assume an A4-class page (8.27 x 11.69 inches) rather
// than reading the document's actual page geometry. Pages with other aspect
// ratios render slightly distorted; callers must tolerate that.
const PAGE_WIDTH_INCHES: f64 = 8.27;
const PAGE_HEIGHT_INCHES: f64 = 11.69;

/// Renders single PDF pages to RGBA raster images.
///
/// Stateless; each call opens and closes its own document handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRenderer;

impl PageRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one page of a PDF at the given DPI.
    ///
    /// `page_number` is zero-based. Returns [`PdfError::PageOutOfRange`] if it
    /// is negative or at/past the page count, [`PdfError::RenderFailure`] on
    /// any decode error.
    pub async fn render(
        &self,
        pdf_bytes: Vec<u8>,
        page_number: i32,
        dpi: u16,
    ) -> Result<RgbaImage, PdfError> {
        tokio::task::spawn_blocking(move || render_page_blocking(&pdf_bytes, page_number, dpi))
            .await?
    }

    /// Render one page and encode it as PNG.
    ///
    /// Used for first-page upload previews (typically at a low DPI).
    pub async fn render_png(
        &self,
        pdf_bytes: Vec<u8>,
        page_number: i32,
        dpi: u16,
    ) -> Result<Vec<u8>, PdfError> {
        tokio::task::spawn_blocking(move || {
            let image = render_page_blocking(&pdf_bytes, page_number, dpi)?;
            encode_png(&image)
        })
        .await?
    }
}

/// Blocking page render. Also used by the OCR loop, which renders many pages
/// inside a single blocking task.
pub(crate) fn render_page_blocking(
    pdf_bytes: &[u8],
    page_number: i32,
    dpi: u16,
) -> Result<RgbaImage, PdfError> {
    let target_width = (PAGE_WIDTH_INCHES * f64::from(dpi)) as i32;
    let target_height = (PAGE_HEIGHT_INCHES * f64::from(dpi)) as i32;

    let pdfium = bind_pdfium()?;
    let document =
        pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| PdfError::RenderFailure {
                reason: format!("failed to open document: {}", e),
            })?;

    let pages = document.pages();
    let page_count = pages.len();
    if page_number < 0 || page_number >= i32::from(page_count) {
        return Err(PdfError::PageOutOfRange {
            page: page_number,
            page_count,
        });
    }

    let page = pages
        .get(page_number as u16)
        .map_err(|e| PdfError::RenderFailure {
            reason: format!("failed to load page {}: {}", page_number, e),
        })?;

    let bitmap = page
        .render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(target_width)
                .set_target_height(target_height),
        )
        .map_err(|e| PdfError::RenderFailure {
            reason: format!("failed to render page {}: {}", page_number, e),
        })?;

    Ok(bitmap.as_image().into_rgba8())
}

/// Encode an RGBA image as PNG.
pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PdfError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| PdfError::Encode {
            reason: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dimensions_scale_with_dpi() {
        // 200 DPI on an A4-class page
        let width = (PAGE_WIDTH_INCHES * 200.0) as i32;
        let height = (PAGE_HEIGHT_INCHES * 200.0) as i32;
        assert_eq!(width, 1654);
        assert_eq!(height, 2338);
    }

    #[test]
    fn test_encode_png_roundtrip() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let png = encode_png(&image).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    // Rendering real pages requires the pdfium shared library.

    #[tokio::test]
    #[ignore]
    async fn test_negative_page_rejected() {
        let pdf = crate::pdf::fixtures::one_page_pdf();
        let result = PageRenderer::new().render(pdf, -1, 50).await;
        assert!(matches!(result, Err(PdfError::PageOutOfRange { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_page_at_count_rejected() {
        let pdf = crate::pdf::fixtures::one_page_pdf();
        let renderer = PageRenderer::new();
        // The single page renders; page index == page count does not.
        let first = renderer.render(pdf.clone(), 0, 50).await;
        assert!(first.is_ok());
        let result = renderer.render(pdf, 1, 50).await;
        assert!(matches!(
            result,
            Err(PdfError::PageOutOfRange { page: 1, page_count: 1 })
        ));
    }
}
