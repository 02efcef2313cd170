// Token normalization — lowercase, stop-word, length, and alphabetic filters.
//
// The output is a space-joined token stream, order-preserving and not
// deduplicated: frequency analysis downstream doesn't care about order,
// but phrase-level analysis would, so order is never thrown away here.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Stop words specific to academic papers, on top of the English list.
const DOMAIN_STOP_WORDS: &[&str] = &[
    "et",
    "al",
    "fig",
    "figure",
    "table",
    "doi",
    "http",
    "https",
    "arxiv",
    "preprint",
    "abstract",
    "introduction",
    "conclusion",
    "paper",
    "study",
    "research",
    "article",
    "author",
    "results",
];

/// Reduces cleaned text to a normalized token stream.
pub struct Tokenizer {
    stop_words: HashSet<String>,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        let mut stop_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        stop_words.extend(DOMAIN_STOP_WORDS.iter().map(|w| w.to_string()));
        Self {
            stop_words,
            min_token_len: 3,
        }
    }

    /// Normalize cleaned text into a space-joined token stream.
    ///
    /// A token survives only if, after lowercasing and trimming edge
    /// punctuation, it is at least `min_token_len` characters, entirely
    /// alphabetic, and not a stop word.
    pub fn normalize(&self, text: &str) -> String {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .filter_map(|raw| {
                let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
                if self.keep(token) {
                    Some(token)
                } else {
                    None
                }
            })
            .collect();

        tokens.join(" ").to_lowercase()
    }

    fn keep(&self, token: &str) -> bool {
        if token.chars().count() < self.min_token_len {
            return false;
        }
        if !token.chars().all(|c| c.is_alphabetic()) {
            return false;
        }
        let lower = token.to_lowercase();
        !self.stop_words.contains(&lower)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_output() {
        let tok = Tokenizer::new();
        assert_eq!(tok.normalize("Governance Framework"), "governance framework");
    }

    #[test]
    fn drops_stop_words() {
        let tok = Tokenizer::new();
        let out = tok.normalize("the algorithm and the model");
        assert_eq!(out, "algorithm model");
    }

    #[test]
    fn drops_domain_stop_words() {
        let tok = Tokenizer::new();
        let out = tok.normalize("smith et al published results in this paper about fairness");
        assert!(!out.contains("paper"));
        assert!(!out.contains("results"));
        assert!(out.contains("fairness"));
        assert!(out.contains("published"));
    }

    #[test]
    fn drops_short_tokens() {
        let tok = Tokenizer::new();
        assert_eq!(tok.normalize("ai ml governance"), "governance");
    }

    #[test]
    fn drops_non_alphabetic_tokens() {
        let tok = Tokenizer::new();
        let out = tok.normalize("gpt4 model2024 state-of-the-art governance");
        assert_eq!(out, "governance");
    }

    #[test]
    fn trims_edge_punctuation_before_filtering() {
        // After cleaning, sentence punctuation is still attached to words.
        let tok = Tokenizer::new();
        let out = tok.normalize("governance, fairness. (transparency)");
        assert_eq!(out, "governance fairness transparency");
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let tok = Tokenizer::new();
        let out = tok.normalize("model governance model");
        assert_eq!(out, "model governance model");
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        let tok = Tokenizer::new();
        let once = tok.normalize("The Algorithm, discussed by Smith et al., shows Model drift!");
        let twice = tok.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalization_only_removes_content() {
        let tok = Tokenizer::new();
        let inputs = [
            "The quick brown fox jumps over the lazy dog",
            "AI governance frameworks (2024) require transparency, accountability.",
            "a b c",
            "",
        ];
        for input in inputs {
            assert!(
                tok.normalize(input).len() <= input.len(),
                "normalize grew input {input:?}"
            );
        }
    }
}
