//! Two-stage cheat-sheet recommendation pipeline.
//!
//! Stage 1 expands a free-text user query into keywords and categories,
//! searches the catalog, and builds a candidate draft. Stage 2 asks the model
//! to refine the draft into a small set of tips, book titles, and tag titles,
//! then resolves those titles back against the pre-fetched candidates.
//!
//! The model only ever sees titles and its output is only ever used to
//! filter and reorder the candidate set — it can never inject a book or tag
//! that does not exist in the catalog, and it never asserts IDs.

use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::{BookSummary, CatalogProvider, TagRef};
use crate::error::AnalysisError;
use crate::llm::{strip_markdown_fences, TextCompletion};

/// Maximum candidate books fetched by the stage-1 keyword search.
const CANDIDATE_BOOK_LIMIT: usize = 20;
/// Maximum books/tags surviving stage-2 resolution.
const SELECTION_CAP: usize = 5;
/// Backfill each list up to this size when resolution comes up short.
const BACKFILL_FLOOR: usize = 3;

/// Stage-1 output parsed from the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryAnalysisResult {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Intermediate candidate set passed from stage 1 to stage 2.
#[derive(Debug, Clone, Default)]
pub struct CheatSheetDraft {
    pub books: Vec<BookSummary>,
    pub tags: Vec<TagRef>,
    pub tips: Vec<String>,
}

/// Stage-2 output parsed from the model. Books and tags are title hints only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheatSheetRefinement {
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub books: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Final curated result: tips plus catalog-resolved books and tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheatSheet {
    pub tips: Vec<String>,
    pub books: Vec<BookSummary>,
    pub tags: Vec<TagRef>,
}

/// Query-driven recommendation pipeline.
pub struct CheatSheetPipeline {
    completion: Arc<dyn TextCompletion>,
    catalog: Arc<dyn CatalogProvider>,
}

impl CheatSheetPipeline {
    pub fn new(completion: Arc<dyn TextCompletion>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            completion,
            catalog,
        }
    }

    /// Run both stages for a user query.
    pub async fn generate(&self, user_query: &str) -> Result<CheatSheet, AnalysisError> {
        let draft = self.build_candidates(user_query).await?;
        self.refine(draft, user_query).await
    }

    /// Stage 1: expand the query into keywords/categories and assemble the
    /// candidate set from the catalog.
    ///
    /// A malformed stage-1 response is a hard error — without keywords there
    /// is nothing to search, so there is no sensible degraded result.
    pub async fn build_candidates(&self, user_query: &str) -> Result<CheatSheetDraft, AnalysisError> {
        let all_tags = self.catalog.list_tags().await?;
        let tag_titles: Vec<&str> = all_tags.iter().map(|t| t.title.as_str()).collect();

        let prompt = build_query_analysis_prompt(user_query, &tag_titles)?;
        let response = self.completion.complete(&prompt).await?;
        let cleaned = strip_markdown_fences(&response);

        let analysis: QueryAnalysisResult =
            serde_json::from_str(&cleaned).map_err(|e| AnalysisError::ResponseParse {
                expected: "QueryAnalysisResult".to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            keywords = analysis.keywords.len(),
            categories = analysis.categories.len(),
            "query analysis parsed"
        );

        let books = self
            .catalog
            .search_books_by_keywords(&analysis.keywords, CANDIDATE_BOOK_LIMIT)
            .await?;

        let tags = all_tags
            .into_iter()
            .filter(|tag| analysis.categories.iter().any(|c| c == &tag.title))
            .collect();

        Ok(CheatSheetDraft {
            books,
            tags,
            tips: Vec::new(),
        })
    }

    /// Stage 2: refine the candidate draft into the final cheat sheet.
    ///
    /// A malformed stage-2 response degrades to an empty refinement (pure
    /// backfill) instead of failing — this stage is recommendation-quality,
    /// not correctness-critical.
    pub async fn refine(
        &self,
        draft: CheatSheetDraft,
        user_query: &str,
    ) -> Result<CheatSheet, AnalysisError> {
        let book_titles: Vec<&str> = draft.books.iter().map(|b| b.title.as_str()).collect();
        let tag_titles: Vec<&str> = draft.tags.iter().map(|t| t.title.as_str()).collect();

        let prompt = build_refinement_prompt(user_query, &book_titles, &tag_titles)?;
        let response = self.completion.complete(&prompt).await?;
        let cleaned = strip_markdown_fences(&response);

        let refinement: CheatSheetRefinement = match serde_json::from_str(&cleaned) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "refinement response unparseable, degrading to backfill");
                CheatSheetRefinement::default()
            }
        };

        Ok(resolve_refinement(draft, refinement))
    }
}

/// Resolve the model's title hints against the draft and apply backfill.
fn resolve_refinement(draft: CheatSheetDraft, refinement: CheatSheetRefinement) -> CheatSheet {
    // Books: case-insensitive substring containment (title contains hint)
    let mut books: Vec<BookSummary> = draft
        .books
        .iter()
        .filter(|book| {
            let title = book.title.to_lowercase();
            refinement
                .books
                .iter()
                .any(|hint| title.contains(&hint.to_lowercase()))
        })
        .take(SELECTION_CAP)
        .cloned()
        .collect();

    // Tags: case-insensitive exact match
    let mut tags: Vec<TagRef> = draft
        .tags
        .iter()
        .filter(|tag| {
            let title = tag.title.to_lowercase();
            refinement
                .tags
                .iter()
                .any(|hint| title == hint.to_lowercase())
        })
        .take(SELECTION_CAP)
        .cloned()
        .collect();

    // Backfill from not-yet-selected candidates, resolved entries first
    if books.len() < BACKFILL_FLOOR {
        let missing = BACKFILL_FLOOR - books.len();
        let extra: Vec<BookSummary> = draft
            .books
            .iter()
            .filter(|b| !books.iter().any(|selected| selected.id == b.id))
            .take(missing)
            .cloned()
            .collect();
        books.extend(extra);
    }
    if tags.len() < BACKFILL_FLOOR {
        let missing = BACKFILL_FLOOR - tags.len();
        let extra: Vec<TagRef> = draft
            .tags
            .iter()
            .filter(|t| !tags.iter().any(|selected| selected.id == t.id))
            .take(missing)
            .cloned()
            .collect();
        tags.extend(extra);
    }

    CheatSheet {
        tips: refinement.tips,
        books,
        tags,
    }
}

/// Stage-1 prompt: keyword and category expansion over the tag vocabulary.
fn build_query_analysis_prompt(
    user_query: &str,
    tag_titles: &[&str],
) -> Result<String, AnalysisError> {
    let tags_json = serde_json::to_string(tag_titles)?;

    Ok(format!(
        r#"
USER QUERY: {user_query}

AVAILABLE TAGS ({count}):
{tags_json}

INSTRUCTIONS:
1. Analyze the query and extract 15-20 core technical concepts including English/Ukrainian variants
2. Identify minimum 5-7 categories from available tags using semantic matching
3. Consider synonyms and related concepts
4. Output format:
{{
    "keywords": [],
    "categories": []
}}

EXAMPLES:
Query: Як покращити безпеку мого .NET API?
Output: {{
    "keywords": ["безпека API", "OAuth 2.0", "JWT tokens", ".NET Core", "HTTPS", "CORS"],
    "categories": ["Кібербезпека", "Веб-розробка", "REST API", "Аутентифікація", ".NET"]
}}

STRICT RESPONSE RULES:
1. Output MUST be pure JSON ONLY
2. Never add comments, markdown (```json) or text
3. Ensure proper JSON escaping for Ukrainian characters
4. Validate JSON syntax before responding

BAD EXAMPLE:
```json
{{...}}
```
GOOD EXAMPLE:
{{...}}
"#,
        count = tag_titles.len(),
    ))
}

/// Stage-2 prompt: tip generation plus book/tag selection over titles only.
fn build_refinement_prompt(
    user_query: &str,
    book_titles: &[&str],
    tag_titles: &[&str],
) -> Result<String, AnalysisError> {
    let books_json = serde_json::to_string(book_titles)?;
    let tags_json = serde_json::to_string(tag_titles)?;

    Ok(format!(
        r#"
USER QUERY: {user_query}

CONTEXT DATA:
- Available books: {books_json}
- Available tags: {tags_json}

STRICT INSTRUCTIONS:
1. Generate 3-5 practical tips:
   a) 2-3 tips BASED DIRECTLY on books/tags from context
   b) 1-2 GENERAL best practices from industry experience
   c) All tips must be actionable and technically specific

2. Book selection criteria:
   - 3-5 titles with either:
     * Direct keyword match
     * Conceptual relevance to general tips
   - Prefer newer editions for technical topics

3. Tag selection rules:
   - 3-5 MOST SPECIFIC tags matching either:
     * Technical aspects from query
     * Cross-cutting concerns from general tips

RESPONSE TEMPLATE:
{{
    "tips": [
        "Конкретна порада з використанням книги",
        "Загальна рекомендація без прив'язки до ресурсів"
    ],
    "books": ["Точна назва 1", "Точна назва 2"],
    "tags": ["Тег 1", "Тег 2"]
}}

STRICT RESPONSE RULES:
1. Output MUST be pure JSON ONLY
2. Never add comments, markdown (```json) or text
3. Ensure proper JSON escaping for Ukrainian characters
4. Validate JSON syntax before responding

EXAMPLES:
Example 1 (Technical):
{{
    "tips": [
        "Застосовуйте принцип Single Responsibility з книги 'Чистий код' для модульного дизайну",
        "Використовуйте Typescript для строгої типізації в великих проєктах",
        "Регулярно оновлюйте залежності через вразливості безпеки"
    ],
    "books": ["Чистий код", "TypeScript Essentials"],
    "tags": ["SOLID", "Типізація", "Безпека"]
}}

Example 2 (General):
{{
    "tips": [
        "Впроваджуйте CI/CD пайплайни для автоматизації тестування",
        "Використовуйте контейнеризацію для однакових середовищ розробки",
        "Проводьте перформанс-тести перед релізом"
    ],
    "books": ["Continuous Delivery Handbook", "Docker in Action"],
    "tags": ["DevOps", "Тестування", "Оптимізація"]
}}

HARD REQUIREMENTS:
1. Minimum 1 general tip unrelated to books
2. Tips must include BOTH types (specific/general)
3. Never repeat same advice in different tips
4. General tips should reflect industry standards
5. Use exact titles from Context Data
"#,
    ))
}
