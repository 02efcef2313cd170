// Policy-area taxonomy scoring.
//
// The taxonomy is fixed at compile time and never mutated. Scoring is
// deliberately naive substring counting over the concatenated normalized
// corpus — "law" matches inside "lawyer". That over-counting is part of
// the established behavior of this scoring pass and is kept as-is.

use serde::Serialize;

/// A fixed subject-matter category with its keyword set.
#[derive(Debug)]
pub struct PolicyArea {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// The fixed taxonomy the report scores the corpus against.
pub const POLICY_AREAS: &[PolicyArea] = &[
    PolicyArea {
        name: "AI Governance & Regulation",
        keywords: &["regulation", "policy", "governance", "act", "law", "compliance"],
    },
    PolicyArea {
        name: "AI Ethics & Fairness",
        keywords: &["ethical", "fairness", "bias", "discrimination", "transparency"],
    },
    PolicyArea {
        name: "AI & Society",
        keywords: &["social", "society", "human", "impact", "trust", "rights"],
    },
    PolicyArea {
        name: "AI Technology & Innovation",
        keywords: &["learning", "model", "algorithm", "data", "system", "technology"],
    },
    PolicyArea {
        name: "AI Applications",
        keywords: &["healthcare", "autonomous", "driving", "education", "recommendation"],
    },
];

/// One area's relevance to the corpus.
#[derive(Debug, Clone, Serialize)]
pub struct AreaScore {
    pub name: String,
    /// The first few keywords, used in the report's description line
    pub keywords: Vec<String>,
    /// Total keyword occurrence count across the normalized corpus
    pub score: usize,
}

/// Score every policy area against the concatenated normalized corpus
/// text. Returns all areas; the significance filter is applied at
/// report time so callers can log the full breakdown.
pub fn relevance_scores(corpus_text: &str) -> Vec<AreaScore> {
    POLICY_AREAS
        .iter()
        .map(|area| {
            let score = area
                .keywords
                .iter()
                .map(|keyword| corpus_text.matches(keyword).count())
                .sum();
            AreaScore {
                name: area.name.to_string(),
                keywords: area.keywords.iter().map(|k| k.to_string()).collect(),
                score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(scores: &[AreaScore], name: &str) -> usize {
        scores.iter().find(|s| s.name == name).unwrap().score
    }

    #[test]
    fn counts_keyword_occurrences() {
        let scores = relevance_scores("fairness bias fairness");
        assert_eq!(score_of(&scores, "AI Ethics & Fairness"), 3);
    }

    #[test]
    fn every_area_is_scored() {
        let scores = relevance_scores("");
        assert_eq!(scores.len(), POLICY_AREAS.len());
        assert!(scores.iter().all(|s| s.score == 0));
    }

    #[test]
    fn substring_matching_counts_inside_longer_tokens() {
        // "law" inside "lawyer" counts — established behavior, not a bug fix target
        let scores = relevance_scores("lawyer");
        assert_eq!(score_of(&scores, "AI Governance & Regulation"), 1);
    }

    #[test]
    fn adding_a_keyword_document_strictly_increases_the_score() {
        let base = "governance model transparency";
        let before = relevance_scores(base);
        let extended = format!("{base} new document about regulation arrived");
        let after = relevance_scores(&extended);
        assert!(
            score_of(&after, "AI Governance & Regulation")
                > score_of(&before, "AI Governance & Regulation")
        );
    }

    #[test]
    fn one_keyword_can_feed_multiple_areas() {
        // "model" is a Technology keyword; "recommendation" an Applications one
        let scores = relevance_scores("model recommendation model");
        assert_eq!(score_of(&scores, "AI Technology & Innovation"), 2);
        assert_eq!(score_of(&scores, "AI Applications"), 1);
    }
}
