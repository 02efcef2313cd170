// Text-level cleaning rewrites applied to freshly extracted text.
//
// The rewrite order matters: every later rule assumes whitespace runs
// have already been collapsed to single spaces.

use regex_lite::Regex;

/// Applies the fixed sequence of cleaning rewrites to extracted text.
///
/// Regexes are compiled once at construction; one cleaner is shared
/// across the whole batch.
pub struct TextCleaner {
    whitespace: Regex,
    url: Regex,
    email: Regex,
    disallowed: Regex,
    short_number: Regex,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").expect("valid regex"),
            url: Regex::new(r"https?://(?:[A-Za-z0-9$\-_@.&+!*(),]|%[0-9a-fA-F]{2})+")
                .expect("valid regex"),
            email: Regex::new(r"\S+@\S+").expect("valid regex"),
            disallowed: Regex::new(r"[^\w\s.,!?;:\-()]").expect("valid regex"),
            short_number: Regex::new(r"\b\d{1,3}\b").expect("valid regex"),
        }
    }

    /// Run the five rewrites in order and trim the result.
    ///
    /// 1. collapse whitespace runs to a single space
    /// 2. strip URL-shaped substrings
    /// 3. strip email-shaped substrings
    /// 4. replace characters outside the kept punctuation set with a space
    /// 5. drop standalone 1-3 digit numbers (4-digit years survive —
    ///    page numbers and footnote markers don't carry signal, years do)
    pub fn clean(&self, text: &str) -> String {
        let text = self.whitespace.replace_all(text, " ");
        let text = self.url.replace_all(&text, "");
        let text = self.email.replace_all(&text, "");
        let text = self.disallowed.replace_all(&text, " ");
        let text = self.short_number.replace_all(&text, "");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn strips_urls() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("see https://example.org/paper.pdf for details");
        assert!(!cleaned.contains("example.org"), "got: {cleaned}");
        assert!(cleaned.contains("see"));
        assert!(cleaned.contains("details"));
    }

    #[test]
    fn strips_emails() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("contact author@example.org today");
        assert!(!cleaned.contains('@'));
        assert!(cleaned.contains("contact"));
        assert!(cleaned.contains("today"));
    }

    #[test]
    fn replaces_disallowed_characters() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("model* accuracy† 90% [sic]");
        assert!(!cleaned.contains('*'));
        assert!(!cleaned.contains('†'));
        assert!(!cleaned.contains('%'));
        assert!(!cleaned.contains('['));
        // kept punctuation survives
        assert!(cleaner.clean("yes, really (see fig. 4)").contains("(see fig."));
    }

    #[test]
    fn drops_short_numbers_keeps_years() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("page 12 of the 2024 report, section 3");
        assert!(!cleaned.contains("12"));
        assert!(!cleaned.contains(" 3"));
        assert!(cleaned.contains("2024"));
    }

    #[test]
    fn output_is_trimmed() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("   hello   "), "hello");
    }

    #[test]
    fn empty_input_stays_empty() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean(""), "");
    }

    #[test]
    fn cleaning_never_grows_the_text() {
        let cleaner = TextCleaner::new();
        let inputs = [
            "a  b\t\tc",
            "see https://example.org and email me@here.org now!",
            "†‡§ weird ∆ symbols ¶",
            "plain text with no issues at all",
        ];
        for input in inputs {
            assert!(
                cleaner.clean(input).len() <= input.len(),
                "clean grew input {input:?}"
            );
        }
    }
}
