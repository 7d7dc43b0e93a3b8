//! Extraction orchestration: direct text layer first, OCR fallback second.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ExtractError, OcrError, PdfError};
use crate::ocr::OcrEngine;
use crate::pdf::{DirectTextExtractor, TextValidity};

/// A source of text for a PDF byte buffer.
///
/// Both the direct text-layer extractor and the OCR engine sit behind this
/// seam so the orchestrator's fallback ordering is observable in tests.
#[async_trait]
pub trait PdfTextSource: Send + Sync {
    async fn extract_text(&self, pdf_bytes: Vec<u8>, max_pages: u16)
        -> Result<String, ExtractError>;
}

#[async_trait]
impl PdfTextSource for DirectTextExtractor {
    async fn extract_text(
        &self,
        pdf_bytes: Vec<u8>,
        max_pages: u16,
    ) -> Result<String, ExtractError> {
        self.extract(pdf_bytes, max_pages)
            .await
            .map_err(PdfError::into)
    }
}

#[async_trait]
impl PdfTextSource for OcrEngine {
    async fn extract_text(
        &self,
        pdf_bytes: Vec<u8>,
        max_pages: u16,
    ) -> Result<String, ExtractError> {
        self.extract_via_ocr(pdf_bytes, max_pages)
            .await
            .map_err(OcrError::into)
    }
}

/// Two-state fallback machine: try the direct text layer, fall back to OCR,
/// reject when neither produces valid text.
///
/// Every invocation re-extracts from scratch; nothing is cached between
/// requests. The OCR path re-reads the original byte buffer, not any
/// intermediate result of the direct attempt.
pub struct ExtractionOrchestrator {
    direct: Arc<dyn PdfTextSource>,
    ocr: Arc<dyn PdfTextSource>,
    validity: TextValidity,
}

impl ExtractionOrchestrator {
    pub fn new(
        direct: Arc<dyn PdfTextSource>,
        ocr: Arc<dyn PdfTextSource>,
        validity: TextValidity,
    ) -> Self {
        Self {
            direct,
            ocr,
            validity,
        }
    }

    /// Extract analysis-ready text from a PDF.
    ///
    /// Returns [`ExtractError::InsufficientText`] when both the direct layer
    /// and OCR fall below the validity threshold — a normal rejection, not a
    /// bug. Low-quality text is never returned silently.
    pub async fn extract(&self, pdf_bytes: &[u8], max_pages: u16) -> Result<String, ExtractError> {
        let direct_text = self
            .direct
            .extract_text(pdf_bytes.to_vec(), max_pages)
            .await?;
        if self.validity.is_valid(&direct_text) {
            tracing::debug!(chars = direct_text.len(), "direct extraction succeeded");
            return Ok(direct_text);
        }

        tracing::info!(
            chars = direct_text.len(),
            "direct extraction below validity threshold, falling back to OCR"
        );

        let ocr_text = self.ocr.extract_text(pdf_bytes.to_vec(), max_pages).await?;
        if self.validity.is_valid(&ocr_text) {
            tracing::debug!(chars = ocr_text.len(), "OCR fallback succeeded");
            return Ok(ocr_text);
        }

        Err(ExtractError::InsufficientText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records invocation order and returns a fixed result.
    struct StubSource {
        text: String,
        calls: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
    }

    #[async_trait]
    impl PdfTextSource for StubSource {
        async fn extract_text(
            &self,
            _pdf_bytes: Vec<u8>,
            _max_pages: u16,
        ) -> Result<String, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.label);
            Ok(self.text.clone())
        }
    }

    fn valid_text() -> String {
        vec!["word"; 60].join(" ")
    }

    fn stub(
        label: &'static str,
        text: String,
        order: Arc<Mutex<Vec<&'static str>>>,
    ) -> (Arc<StubSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(StubSource {
            text,
            calls: calls.clone(),
            order,
            label,
        });
        (source, calls)
    }

    #[tokio::test]
    async fn test_direct_success_skips_ocr() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (direct, _) = stub("direct", valid_text(), order.clone());
        let (ocr, ocr_calls) = stub("ocr", valid_text(), order.clone());

        let orchestrator =
            ExtractionOrchestrator::new(direct, ocr, TextValidity::default());
        let text = orchestrator.extract(b"%PDF", 10).await.unwrap();

        assert_eq!(text, valid_text());
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*order.lock().unwrap(), vec!["direct"]);
    }

    #[tokio::test]
    async fn test_fallback_ordering() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (direct, direct_calls) = stub("direct", "too short".to_string(), order.clone());
        let (ocr, ocr_calls) = stub("ocr", valid_text(), order.clone());

        let orchestrator =
            ExtractionOrchestrator::new(direct, ocr, TextValidity::default());
        let text = orchestrator.extract(b"%PDF", 10).await.unwrap();

        assert_eq!(text, valid_text());
        assert_eq!(direct_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*order.lock().unwrap(), vec!["direct", "ocr"]);
    }

    #[tokio::test]
    async fn test_total_failure_reports_insufficient_text() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (direct, _) = stub("direct", String::new(), order.clone());
        let (ocr, _) = stub("ocr", "still not enough".to_string(), order.clone());

        let orchestrator =
            ExtractionOrchestrator::new(direct, ocr, TextValidity::default());
        let result = orchestrator.extract(b"%PDF", 10).await;

        assert!(matches!(result, Err(ExtractError::InsufficientText)));
    }

    #[tokio::test]
    async fn test_no_caching_between_invocations() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (direct, direct_calls) = stub("direct", valid_text(), order.clone());
        let (ocr, _) = stub("ocr", valid_text(), order);

        let orchestrator =
            ExtractionOrchestrator::new(direct, ocr, TextValidity::default());
        orchestrator.extract(b"%PDF", 10).await.unwrap();
        orchestrator.extract(b"%PDF", 10).await.unwrap();

        assert_eq!(direct_calls.load(Ordering::SeqCst), 2);
    }
}
