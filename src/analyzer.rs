//! Single-stage book-metadata analysis.
//!
//! Takes extracted book text plus the catalog's current authors and tags,
//! builds one strict-format prompt, and issues exactly one completion call.
//! The raw response is returned verbatim: parsing, fence-stripping, and any
//! retry policy belong to the caller.

use std::sync::Arc;

use crate::catalog::{AuthorRef, TagRef};
use crate::error::AnalysisError;
use crate::llm::TextCompletion;

/// Book-metadata analyzer over a text-completion capability.
pub struct MetadataAnalyzer {
    completion: Arc<dyn TextCompletion>,
}

impl MetadataAnalyzer {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Analyze extracted book text against the current catalog context.
    ///
    /// Returns the model's raw response text. The expected (but unenforced)
    /// shape is `{title, authors: [{id?, name}], description, existingTags,
    /// suggestedTags}` — the caller strips markdown fences and parses.
    pub async fn analyze(
        &self,
        text: &str,
        tags: &[TagRef],
        authors: &[AuthorRef],
    ) -> Result<String, AnalysisError> {
        let prompt = build_analysis_prompt(text, tags, authors)?;
        tracing::info!(
            prompt_chars = prompt.len(),
            tags = tags.len(),
            authors = authors.len(),
            "analyzing book text"
        );
        let response = self.completion.complete(&prompt).await?;
        Ok(response)
    }
}

/// Assemble the analysis prompt. Built fresh per call, never cached.
fn build_analysis_prompt(
    text: &str,
    tags: &[TagRef],
    authors: &[AuthorRef],
) -> Result<String, AnalysisError> {
    let authors_json = serde_json::to_string_pretty(authors)?;
    let tags_json = serde_json::to_string(tags)?;

    Ok(format!(
        r#"
STRICT RULES FOR JSON RESPONSE:
1. Use UTF-8 encoding DIRECTLY, NO Unicode escapes
2. Ukrainian text only for content, technical terms in English when needed

STRICT INSTRUCTIONS FOR BOOK ANALYSIS:

1. CONTEXT ANALYSIS:
- Carefully analyze text from book's content, preface, and chapter titles
- Identify CORE THEMES, not incidental mentions
- For technical books: focus on methodologies, paradigms, practices
- Ignore publisher information and unrelated advertisements

2. TITLE EXTRACTION:
- Extract EXACT book title from context
- Title must match cover page and ISBN data
- Remove edition numbers or publisher prefixes

3. AUTHOR SELECTION RULES:
Existing authors (JSON):
{authors_json}
- Select ALL matching authors from provided list
- Priority order for matches:
  1. Exact matches from title page (ordered as listed)
  2. Authors mentioned in introduction
  3. Partial name matches
- If no existing authors match: create new author(s) from title page
- Format: ALWAYS use array under 'authors' key

4. TAG SELECTION CRITERIA:
Existing Tags (prefer EXACT matches):
{tags_json}
- Select MAX 5 MOST RELEVANT tags
- Tags MUST represent core concepts:
  Good: 'Рефакторинг', 'Архітектура ПЗ', 'Тестування', 'Java'
  Bad: 'Освіта', 'Підручник', 'Програмування', 'Розробка'
- Never suggest programming languages unless book is SPECIFICALLY about them

5. DESCRIPTION REQUIREMENTS:
- 1200-2000 characters in Ukrainian
- Focus on MAIN CONTENT not preface/examples
- Technical books: emphasize methodologies and practices

EXAMPLE OUTPUTS:
Single author example:
{{
  "title": "Чистий код: Створення, аналіз та рефакторинг",
  "authors": [{{ "name": "Роберт Мартін" }}],
  "description": "Практичний посібник з написання читабельного та ефективного коду...",
  "existingTags": [{{"id":45, "title":"Розробка ПЗ"}}],
  "suggestedTags": ["Читабельність коду", "Рефакторинг"]
}}

Multi-author example:
{{
  "title": "Шаблони проєктування: Elements of Reusable Object-Oriented Software",
  "authors": [
    {{ "id": 87, "name": "Еріх Гамма" }},
    {{ "id": 88, "name": "Річард Хелм" }}
  ],
  "description": "Класичний труд з об'єктно-орієнтованого проєктування...",
  "existingTags": [{{"id":12, "title":"ООП"}}],
  "suggestedTags": ["Паттерни проєктування"]
}}

YOUR RESPONSE MUST:
- Be pure JSON without markdown formatting
- Use 'authors' key with array (even for single author)
- Prioritize authors in order they appear on title page
- Include ALL valid existing authors from provided list
- Create new authors ONLY when no matches exist

BOOK TEXT TO ANALYZE:
===
{text}
===
"#
    ))
}
