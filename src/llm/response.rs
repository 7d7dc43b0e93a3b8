//! Model-response sanitation.
//!
//! Models asked for pure JSON still wrap output in markdown fences often
//! enough that every parse site must defend against it. All fence handling
//! lives here so call sites never do ad hoc string surgery.

/// Strip leading/trailing markdown code fences from a model response.
///
/// Handles the shapes observed in practice:
/// - ```` ```json\n{...}\n``` ````
/// - ```` ```\n{...}\n``` ````
/// - a bare `json` prefix left over after fence removal
/// - plain unfenced output (returned trimmed, unchanged otherwise)
pub fn strip_markdown_fences(response: &str) -> String {
    let mut text = response.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
        // Language tag on the opening fence, e.g. ```json
        if let Some(newline) = text.find('\n') {
            let tag = text[..newline].trim();
            if tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                text = &text[newline + 1..];
            }
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    let mut cleaned = text.trim();
    // A stray "json" tag can survive when the fence and tag were split
    // across the response (the model sometimes emits "json\n{...}").
    if let Some(rest) = cleaned.strip_prefix("json") {
        let rest_trimmed = rest.trim_start();
        if rest_trimmed.starts_with('{') || rest_trimmed.starts_with('[') {
            cleaned = rest_trimmed;
        }
    }

    cleaned.trim().to_string()
}
