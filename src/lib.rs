//! Book-ingestion analysis pipeline for a library catalog.
//!
//! Given an uploaded PDF, the pipeline decides how to extract its text
//! (native text layer vs. OCR fallback), validates that the result is worth
//! analyzing, and drives generative-model calls that turn raw book text plus
//! the existing catalog's authors and tags into structured metadata ready
//! for insertion. A separate two-stage pipeline expands a free-text query
//! into catalog search terms and refines the candidates into a curated
//! "cheat sheet" of tips, books, and tags.
//!
//! Controllers, persistence, identity, and file storage live elsewhere; this
//! crate consumes a [`llm::TextCompletion`] capability and read-only
//! [`catalog::CatalogProvider`] lookups, and produces plain strings and
//! structs for the caller to persist.
//!
//! # Flow
//!
//! ```text
//! PDF bytes ──> DirectTextExtractor ──┐
//!                                     ├─ TextValidity gate ──> MetadataAnalyzer ──> raw JSON
//! PDF bytes ──> OcrEngine (fallback) ─┘
//!
//! user query ──> CheatSheetPipeline stage 1 (keywords + catalog search)
//!            ──> stage 2 (refine + resolve + backfill) ──> CheatSheet
//! ```
//!
//! Model output is always treated as untrusted text: fences are stripped
//! before parsing, and cheat-sheet books/tags are resolved against the
//! pre-fetched candidate set rather than trusting model titles or IDs.

pub mod analyzer;
pub mod catalog;
pub mod cheatsheet;
pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod ocr;
pub mod pdf;

pub use analyzer::MetadataAnalyzer;
pub use catalog::{AuthorRef, BookSummary, CatalogProvider, InMemoryCatalog, TagRef};
pub use cheatsheet::{CheatSheet, CheatSheetDraft, CheatSheetPipeline};
pub use config::{PageFailurePolicy, PipelineConfig};
pub use error::{Error, Result};
pub use extract::{ExtractionOrchestrator, PdfTextSource};
pub use ingest::BookIngestion;
pub use llm::{GeminiConfig, GeminiProvider, TextCompletion};
pub use ocr::OcrEngine;
pub use pdf::{DirectTextExtractor, PageRenderer, TextValidity};
