//! Read-only catalog projections used for prompt grounding.
//!
//! The pipeline never mutates catalog state. It consumes lightweight
//! `{id, name/title}` views of authors and tags and a keyword search over
//! books, and resolves model output back against these projections.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Lightweight tag projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i32,
    pub title: String,
}

/// Lightweight author projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: i32,
    pub name: String,
}

/// Book candidate returned by keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Read-only catalog lookups consumed by the analysis pipelines.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All tags as `{id, title}` projections.
    async fn list_tags(&self) -> Result<Vec<TagRef>, CatalogError>;

    /// All authors as `{id, name}` projections.
    async fn list_authors(&self) -> Result<Vec<AuthorRef>, CatalogError>;

    /// Substring keyword search over book titles and descriptions.
    ///
    /// OR semantics: a book matches if its title or description contains ANY
    /// of the keywords. Results are capped at `limit`.
    async fn search_books_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<BookSummary>, CatalogError>;
}

/// In-memory catalog, used in tests and for embedding without a database.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    tags: Vec<TagRef>,
    authors: Vec<AuthorRef>,
    books: Vec<BookSummary>,
}

impl InMemoryCatalog {
    pub fn new(tags: Vec<TagRef>, authors: Vec<AuthorRef>, books: Vec<BookSummary>) -> Self {
        Self {
            tags,
            authors,
            books,
        }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_tags(&self) -> Result<Vec<TagRef>, CatalogError> {
        Ok(self.tags.clone())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorRef>, CatalogError> {
        Ok(self.authors.clone())
    }

    async fn search_books_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<BookSummary>, CatalogError> {
        let matches = self
            .books
            .iter()
            .filter(|b| {
                keywords
                    .iter()
                    .any(|k| b.title.contains(k.as_str()) || b.description.contains(k.as_str()))
            })
            .take(limit)
            .cloned()
            .collect();
        Ok(matches)
    }
}
