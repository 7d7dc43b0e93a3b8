//! Book-ingestion facade.
//!
//! Wires the extraction orchestrator, catalog context, and metadata analyzer
//! into the flow an upload handler needs: extract text (with OCR fallback),
//! gate on validity, analyze against the current catalog, and hand back
//! fence-stripped JSON text for the caller to parse and persist.

use std::sync::Arc;

use crate::analyzer::MetadataAnalyzer;
use crate::catalog::CatalogProvider;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, OcrError};
use crate::extract::ExtractionOrchestrator;
use crate::llm::{strip_markdown_fences, TextCompletion};
use crate::ocr::OcrEngine;
use crate::pdf::{DirectTextExtractor, PageRenderer, TextValidity};

/// End-to-end book ingestion service.
pub struct BookIngestion {
    orchestrator: ExtractionOrchestrator,
    analyzer: MetadataAnalyzer,
    catalog: Arc<dyn CatalogProvider>,
    renderer: PageRenderer,
    config: PipelineConfig,
}

impl BookIngestion {
    pub fn new(
        orchestrator: ExtractionOrchestrator,
        analyzer: MetadataAnalyzer,
        catalog: Arc<dyn CatalogProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            orchestrator,
            analyzer,
            catalog,
            renderer: PageRenderer::new(),
            config,
        }
    }

    /// Build the full service from configuration, constructing the real
    /// extractors. Fails when the OCR language data cannot be loaded.
    pub fn from_config(
        completion: Arc<dyn TextCompletion>,
        catalog: Arc<dyn CatalogProvider>,
        config: PipelineConfig,
    ) -> Result<Self, OcrError> {
        let orchestrator = ExtractionOrchestrator::new(
            Arc::new(DirectTextExtractor::new()),
            Arc::new(OcrEngine::new(&config)?),
            TextValidity::new(config.validity_min_words),
        );
        let analyzer = MetadataAnalyzer::new(completion);
        Ok(Self::new(orchestrator, analyzer, catalog, config))
    }

    /// Extract text from an uploaded PDF, falling back to OCR when the text
    /// layer is unusable.
    ///
    /// `InsufficientText` here means the file should be rejected with a
    /// "could not read enough text from this file" message, not treated as a
    /// server fault.
    pub async fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, AnalysisError> {
        let text = self
            .orchestrator
            .extract(pdf_bytes, self.config.max_pages)
            .await?;
        Ok(text)
    }

    /// Full analysis flow: extract, gate, ground against the catalog, and
    /// run the metadata analyzer.
    ///
    /// The returned string is the model's JSON output with markdown fences
    /// already stripped; parsing and persistence are the caller's job.
    pub async fn analyze_book(&self, pdf_bytes: &[u8]) -> Result<String, AnalysisError> {
        let text = self
            .orchestrator
            .extract(pdf_bytes, self.config.max_pages)
            .await?;

        let tags = self.catalog.list_tags().await?;
        let authors = self.catalog.list_authors().await?;

        let raw = self.analyzer.analyze(&text, &tags, &authors).await?;
        Ok(strip_markdown_fences(&raw))
    }

    /// Render the first page as a PNG preview at the configured preview DPI.
    pub async fn render_first_page(
        &self,
        pdf_bytes: Vec<u8>,
    ) -> Result<Vec<u8>, crate::error::PdfError> {
        self.renderer
            .render_png(pdf_bytes, 0, self.config.preview_dpi)
            .await
    }
}
