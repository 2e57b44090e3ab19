//! Fuzzy keyword detection over the first word of a transcription.
//!
//! Voice transcriptions mangle trigger words ("teo" arrives as "tео" or
//! "teos"), so detection uses normalized Levenshtein similarity against a
//! fixed keyword table instead of exact matching. Pure: no network or
//! storage access, logging only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Category, Detection};

/// Default minimum similarity for a keyword to qualify.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// One row of the keyword table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub word: String,
    pub category: Category,
}

impl KeywordEntry {
    pub fn new(word: impl Into<String>, category: Category) -> Self {
        Self {
            word: word.into(),
            category,
        }
    }
}

/// The trigger words the original bot shipped with.
pub fn default_keywords() -> Vec<KeywordEntry> {
    vec![
        KeywordEntry::new("teo", Category::Task),
        KeywordEntry::new("juan", Category::ActivityLog),
        KeywordEntry::new("ide", Category::Idea),
        KeywordEntry::new("compa", Category::Commitment),
    ]
}

/// Resolves the category of a transcription from its first word.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<KeywordEntry>,
    threshold: f64,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(default_keywords(), DEFAULT_THRESHOLD)
    }
}

impl KeywordMatcher {
    pub fn new(keywords: Vec<KeywordEntry>, threshold: f64) -> Self {
        Self {
            keywords,
            threshold,
        }
    }

    /// Detect the category of `text`.
    ///
    /// Scores the lower-cased first token against every table entry; a
    /// keyword qualifies at similarity >= threshold and the strictly highest
    /// score wins (first max on ties; callers must not rely on tie order).
    /// On a match the first token is stripped from the cleaned text, falling
    /// back to the full original when nothing remains.
    pub fn detect(&self, text: &str) -> Detection {
        let mut words = text.split_whitespace();

        let first = match words.next() {
            Some(w) => w.to_lowercase(),
            None => {
                debug!("Empty transcription, unclassified");
                return Detection::unclassified(text);
            }
        };

        let mut best: Option<(&KeywordEntry, f64)> = None;
        for entry in &self.keywords {
            let score = similarity(&first, &entry.word);
            if score >= self.threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, score)) => {
                let remainder = words.collect::<Vec<_>>().join(" ");
                let cleaned = if remainder.is_empty() {
                    text.to_string()
                } else {
                    remainder
                };

                debug!(
                    first = %first,
                    keyword = %entry.word,
                    similarity = score,
                    category = %entry.category,
                    "Keyword detected"
                );

                Detection {
                    category: entry.category,
                    cleaned_text: cleaned,
                    confidence: score,
                    matched_keyword: Some(entry.word.clone()),
                }
            }
            None => {
                debug!(first = %first, "No keyword matched");
                Detection::unclassified(text)
            }
        }
    }
}

/// Normalized Levenshtein similarity: 1.0 identical, 0.0 disjoint.
/// Case-insensitive (inputs are lower-cased before comparison).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - strsim::levenshtein(&a, &b) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keywords_score_one() {
        let matcher = KeywordMatcher::default();
        for entry in default_keywords() {
            let detection = matcher.detect(&entry.word);
            assert_eq!(detection.category, entry.category, "keyword {}", entry.word);
            assert_eq!(detection.confidence, 1.0);
            assert_eq!(detection.matched_keyword.as_deref(), Some(entry.word.as_str()));
        }
    }

    #[test]
    fn test_empty_input_is_unclassified() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("");
        assert_eq!(detection.category, Category::Unclassified);
        assert_eq!(detection.confidence, 0.0);
        assert_eq!(detection.cleaned_text, "");
    }

    #[test]
    fn test_whitespace_only_is_unclassified() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("   \t  ");
        assert_eq!(detection.category, Category::Unclassified);
        assert_eq!(detection.confidence, 0.0);
    }

    #[test]
    fn test_exact_match_strips_keyword() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("Teo comprar leche mañana");
        assert_eq!(detection.category, Category::Task);
        assert_eq!(detection.cleaned_text, "comprar leche mañana");
        assert_eq!(detection.confidence, 1.0);
    }

    #[test]
    fn test_keyword_only_falls_back_to_original() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("teo");
        assert_eq!(detection.category, Category::Task);
        // Nothing left after the keyword: keep the full original text
        assert_eq!(detection.cleaned_text, "teo");
    }

    #[test]
    fn test_typo_within_threshold() {
        // "teos" vs "teo": distance 1, max len 4 -> 0.75 >= 0.6
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("teos llamar al cliente");
        assert_eq!(detection.category, Category::Task);
        assert!((detection.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_tayo_falls_below_threshold() {
        // "tayo" vs "teo": distance 2, max len 4 -> 0.5 < 0.6
        assert!((similarity("tayo", "teo") - 0.5).abs() < 1e-9);

        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("tayo llamar al cliente");
        assert_eq!(detection.category, Category::Unclassified);
        assert_eq!(detection.confidence, 0.0);
        assert_eq!(detection.cleaned_text, "tayo llamar al cliente");
    }

    #[test]
    fn test_below_threshold_everywhere_is_unclassified() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("recordatorio de algo cualquiera");
        assert_eq!(detection.category, Category::Unclassified);
        assert_eq!(detection.confidence, 0.0);
        assert_eq!(detection.cleaned_text, "recordatorio de algo cualquiera");
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = KeywordMatcher::default();
        let detection = matcher.detect("COMPA enviar informe a Marta");
        assert_eq!(detection.category, Category::Commitment);
        assert_eq!(detection.confidence, 1.0);
    }

    #[test]
    fn test_tie_resolved_by_table_order() {
        let matcher = KeywordMatcher::new(
            vec![
                KeywordEntry::new("nota", Category::Idea),
                KeywordEntry::new("cota", Category::Task),
            ],
            0.6,
        );
        // "rota" is distance 1 from both; first max wins
        let detection = matcher.detect("rota algo");
        assert_eq!(detection.category, Category::Idea);
    }

    #[test]
    fn test_similarity_formula() {
        assert_eq!(similarity("teo", "teo"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        // Unicode: counts chars, not bytes
        assert_eq!(similarity("año", "año"), 1.0);
    }
}
