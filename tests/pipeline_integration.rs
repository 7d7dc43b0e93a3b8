//! Integration tests for the ingestion and recommendation pipelines.
//!
//! These exercise the end-to-end flows without a pdfium library, tesseract
//! language data, or a live model: the text sources and the completion
//! capability are mocked at their trait seams, which is exactly where the
//! real collaborators plug in.
//!
//! Run: `cargo test --test pipeline_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tomescan::catalog::{AuthorRef, BookSummary, InMemoryCatalog, TagRef};
use tomescan::error::{AnalysisError, ExtractError, LlmError};
use tomescan::extract::{ExtractionOrchestrator, PdfTextSource};
use tomescan::ingest::BookIngestion;
use tomescan::llm::TextCompletion;
use tomescan::pdf::TextValidity;
use tomescan::{CheatSheetPipeline, MetadataAnalyzer, PipelineConfig};

// ============================================================================
// Mock collaborators
// ============================================================================

struct CountingSource {
    text: String,
    calls: AtomicUsize,
}

impl CountingSource {
    fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfTextSource for CountingSource {
    async fn extract_text(
        &self,
        _pdf_bytes: Vec<u8>,
        _max_pages: u16,
    ) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

struct ScriptedCompletion {
    responses: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
        })
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::RequestFailed {
                provider: "scripted".to_string(),
                reason: "no scripted response left".to_string(),
            });
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn valid_text() -> String {
    vec!["словослово"; 60].join(" ")
}

fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::new(
        vec![
            TagRef {
                id: 1,
                title: "DevOps".into(),
            },
            TagRef {
                id: 2,
                title: "Тестування".into(),
            },
        ],
        vec![AuthorRef {
            id: 87,
            name: "Еріх Гамма".into(),
        }],
        vec![
            BookSummary {
                id: 10,
                title: "Docker in Action".into(),
                description: "Контейнеризація".into(),
            },
            BookSummary {
                id: 11,
                title: "Clean Code".into(),
                description: "Чистий код".into(),
            },
            BookSummary {
                id: 12,
                title: "Release It".into(),
                description: "Експлуатація".into(),
            },
        ],
    ))
}

// ============================================================================
// Book ingestion journey
// ============================================================================

#[tokio::test]
async fn ingestion_uses_direct_text_without_touching_ocr() {
    let direct = CountingSource::new(valid_text());
    let ocr = CountingSource::new(valid_text());
    let orchestrator =
        ExtractionOrchestrator::new(direct.clone(), ocr.clone(), TextValidity::default());
    let analyzer = MetadataAnalyzer::new(ScriptedCompletion::new(vec![
        "```json\n{\"title\": \"Чистий код\", \"authors\": [{\"name\": \"Роберт Мартін\"}]}\n```",
    ]));
    let service = BookIngestion::new(orchestrator, analyzer, catalog(), PipelineConfig::default());

    let result = service.analyze_book(b"%PDF-fake").await.unwrap();

    assert!(result.starts_with('{'), "fences must be stripped: {result}");
    let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed["title"], "Чистий код");
    assert_eq!(direct.call_count(), 1);
    assert_eq!(ocr.call_count(), 0, "OCR must not run when direct text is valid");
}

#[tokio::test]
async fn ingestion_falls_back_to_ocr_for_scanned_documents() {
    let direct = CountingSource::new(""); // no text layer
    let ocr = CountingSource::new(valid_text());
    let orchestrator =
        ExtractionOrchestrator::new(direct.clone(), ocr.clone(), TextValidity::default());
    let analyzer = MetadataAnalyzer::new(ScriptedCompletion::new(vec!["{\"title\": \"OCR\"}"]));
    let service = BookIngestion::new(orchestrator, analyzer, catalog(), PipelineConfig::default());

    let result = service.analyze_book(b"%PDF-scan").await.unwrap();

    assert!(result.contains("OCR"));
    assert_eq!(direct.call_count(), 1);
    assert_eq!(ocr.call_count(), 1);
}

#[tokio::test]
async fn ingestion_rejects_documents_with_insufficient_text() {
    let direct = CountingSource::new("short");
    let ocr = CountingSource::new("also short");
    let orchestrator = ExtractionOrchestrator::new(direct, ocr, TextValidity::default());
    let analyzer = MetadataAnalyzer::new(ScriptedCompletion::new(vec!["{}"]));
    let service = BookIngestion::new(orchestrator, analyzer, catalog(), PipelineConfig::default());

    let result = service.analyze_book(b"%PDF-empty").await;

    assert!(matches!(
        result,
        Err(AnalysisError::Extract(ExtractError::InsufficientText))
    ));
}

// ============================================================================
// Cheat-sheet journey
// ============================================================================

#[tokio::test]
async fn cheat_sheet_end_to_end() {
    let completion = ScriptedCompletion::new(vec![
        r#"```json
{"keywords": ["Docker", "код", "Експлуатація"], "categories": ["DevOps"]}
```"#,
        r#"{"tips": ["Використовуйте Docker з книги 'Docker in Action'", "Автоматизуйте тести в CI"], "books": ["docker"], "tags": ["devops"]}"#,
    ]);
    let pipeline = CheatSheetPipeline::new(completion, catalog());

    let sheet = pipeline.generate("як розгортати сервіси?").await.unwrap();

    assert_eq!(sheet.tips.len(), 2);
    assert_eq!(sheet.books[0].title, "Docker in Action");
    assert_eq!(sheet.tags[0].title, "DevOps");
    // Backfill keeps the floor of three books when the catalog allows it
    assert_eq!(sheet.books.len(), 3);
}

#[tokio::test]
async fn cheat_sheet_survives_malformed_refinement() {
    let completion = ScriptedCompletion::new(vec![
        r#"{"keywords": ["код"], "categories": []}"#,
        "The model decided to chat instead of returning JSON.",
    ]);
    let pipeline = CheatSheetPipeline::new(completion, catalog());

    let sheet = pipeline.generate("запит").await.unwrap();

    assert!(sheet.tips.is_empty());
    assert!(!sheet.books.is_empty(), "backfill must still supply books");
}

#[tokio::test]
async fn cheat_sheet_stage1_failure_is_fatal() {
    let completion = ScriptedCompletion::new(vec!["not json"]);
    let pipeline = CheatSheetPipeline::new(completion, catalog());

    let result = pipeline.generate("запит").await;

    assert!(matches!(result, Err(AnalysisError::ResponseParse { .. })));
}
