//! Heuristic check for whether extracted text is usable for analysis.

use regex::Regex;

/// Default minimum count of qualifying word tokens.
pub const DEFAULT_MIN_WORDS: usize = 50;

/// Decides whether extracted text is good enough to analyze.
///
/// Text is valid when it is non-blank and contains at least `min_words`
/// word tokens of length >= 3 (Unicode word characters, so Cyrillic counts).
#[derive(Debug, Clone)]
pub struct TextValidity {
    min_words: usize,
    word_pattern: Regex,
}

impl Default for TextValidity {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORDS)
    }
}

impl TextValidity {
    pub fn new(min_words: usize) -> Self {
        Self {
            min_words,
            // \w is Unicode-aware in the regex crate
            word_pattern: Regex::new(r"\b\w{3,}\b").expect("static pattern compiles"),
        }
    }

    /// True when the text clears the word-count threshold.
    pub fn is_valid(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.word_pattern
            .find_iter(text)
            .take(self.min_words)
            .count()
            >= self.min_words
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        vec!["word"; count].join(" ")
    }

    #[test]
    fn test_empty_is_invalid() {
        let checker = TextValidity::default();
        assert!(!checker.is_valid(""));
        assert!(!checker.is_valid("   \n\t  "));
    }

    #[test]
    fn test_threshold_boundary() {
        let checker = TextValidity::default();
        assert!(!checker.is_valid(&words(49)));
        assert!(checker.is_valid(&words(50)));
    }

    #[test]
    fn test_short_tokens_do_not_count() {
        let checker = TextValidity::default();
        // 100 two-letter tokens, zero qualifying words
        let text = vec!["ab"; 100].join(" ");
        assert!(!checker.is_valid(&text));
    }

    #[test]
    fn test_cyrillic_tokens_count() {
        let checker = TextValidity::new(3);
        assert!(checker.is_valid("рефакторинг архітектура тестування"));
    }

    #[test]
    fn test_custom_threshold() {
        let checker = TextValidity::new(5);
        assert_eq!(checker.min_words(), 5);
        assert!(!checker.is_valid(&words(4)));
        assert!(checker.is_valid(&words(5)));
    }
}
