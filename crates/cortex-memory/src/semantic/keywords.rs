//! Case-insensitive keyword matching over a block of text.
//!
//! Single-word keywords match whole tokens; keywords containing spaces or
//! punctuation ("walk me through", "here's") match as substrings.

use std::collections::HashSet;

/// Lowercased text plus its alphanumeric tokens.
pub(crate) struct TextIndex {
    lower: String,
    tokens: Vec<String>,
    token_set: HashSet<String>,
}

impl TextIndex {
    pub(crate) fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let tokens: Vec<String> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let token_set = tokens.iter().cloned().collect();

        Self {
            lower,
            tokens,
            token_set,
        }
    }

    pub(crate) fn contains(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        if is_phrase(&keyword) {
            self.lower.contains(&keyword)
        } else {
            self.token_set.contains(&keyword)
        }
    }

    /// Number of distinct keywords present
    pub(crate) fn count_matching(&self, keywords: &[String]) -> usize {
        keywords.iter().filter(|k| self.contains(k)).count()
    }

    pub(crate) fn matches_any(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.contains(k))
    }

    /// Total token occurrences that belong to `terms` (lowercase)
    pub(crate) fn occurrences(&self, terms: &HashSet<String>) -> usize {
        self.tokens.iter().filter(|t| terms.contains(*t)).count()
    }

    pub(crate) fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

fn is_phrase(keyword: &str) -> bool {
    keyword.chars().any(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_words_match_whole_tokens() {
        let index = TextIndex::new("Please FIX the prefix handling");
        assert!(index.contains("fix"));
        assert!(index.contains("prefix"));
        assert!(!index.contains("pre"));
    }

    #[test]
    fn test_phrases_match_substrings() {
        let index = TextIndex::new("Could you walk me through it? Here's why.");
        assert!(index.contains("walk me through"));
        assert!(index.contains("here's"));
        assert!(!index.contains("step by step"));
    }

    #[test]
    fn test_counts_and_occurrences() {
        let index = TextIndex::new("test the test, then build");
        assert_eq!(index.count_matching(&kws(&["test", "build", "deploy"])), 2);

        let terms: HashSet<String> = ["test".to_string()].into_iter().collect();
        assert_eq!(index.occurrences(&terms), 2);
        assert_eq!(index.token_count(), 5);
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let index = TextIndex::new("anything");
        assert!(!index.contains("  "));
        assert!(!index.matches_any(&[]));
    }
}
