// The landscape assessment report.
//
// Rendering is a pure function of its inputs; the pipeline writes the
// returned string to LANDSCAPE_ASSESSMENT_REPORT.md at the output root.

use chrono::{DateTime, Local};

use crate::policy::AreaScore;
use crate::stats::CorpusStatistics;
use crate::topics::Topic;

pub const REPORT_FILENAME: &str = "LANDSCAPE_ASSESSMENT_REPORT.md";

/// How many ranked terms the themes section lists.
const THEME_COUNT: usize = 10;
/// How many key terms each topic section lists.
const TERMS_PER_TOPIC: usize = 8;

/// Everything the report needs, gathered by the pipeline.
pub struct ReportInputs<'a> {
    pub stats: &'a CorpusStatistics,
    pub topics: &'a [Topic],
    pub areas: &'a [AreaScore],
    /// Documents dropped during extraction
    pub skipped: usize,
    /// Human-readable name of the topic modeling variant used
    pub model_name: &'a str,
    /// Whether the self-contained decomposition variant was used
    pub decomposition_used: bool,
    /// An area appears only when its score exceeds this
    pub significance_threshold: usize,
    pub generated: DateTime<Local>,
}

fn title_case(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the full assessment report as markdown.
pub fn render(inputs: &ReportInputs) -> String {
    let mut out = String::new();

    out.push_str("# AI Research Landscape Assessment\n\n");
    out.push_str(&format!(
        "**Generated:** {}\n\n",
        inputs.generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("---\n\n");

    executive_summary(&mut out, inputs);
    key_themes(&mut out, inputs.stats);
    discovered_topics(&mut out, inputs);
    policy_areas(&mut out, inputs);
    visualizations(&mut out);
    recommendations(&mut out);
    data_files(&mut out);

    out.push_str("---\n\n");
    out.push_str(&format!(
        "*Topic discovery performed with {}.*\n",
        inputs.model_name
    ));

    out
}

fn executive_summary(out: &mut String, inputs: &ReportInputs) {
    let stats = inputs.stats;
    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "This landscape assessment analyzes **{} research publications**.\n\n",
        stats.total_documents
    ));
    out.push_str(&format!(
        "- **Total corpus size:** {} words\n",
        stats.total_words
    ));
    out.push_str(&format!("- **Unique terms:** {}\n", stats.unique_terms));
    out.push_str(&format!(
        "- **Average document length:** {:.0} words\n",
        stats.avg_words
    ));
    out.push_str(&format!(
        "- **Document range:** {} to {} words\n",
        stats.min_words, stats.max_words
    ));
    if inputs.skipped > 0 {
        out.push_str(&format!(
            "- **Documents skipped during extraction:** {}\n",
            inputs.skipped
        ));
    }
    out.push('\n');
}

fn key_themes(out: &mut String, stats: &CorpusStatistics) {
    out.push_str("## Key Research Themes\n\n");
    out.push_str("Based on frequency analysis, the most prominent themes include:\n\n");
    for (i, (term, count)) in stats.top_terms.iter().take(THEME_COUNT).enumerate() {
        out.push_str(&format!(
            "{}. **{}** ({} occurrences)\n",
            i + 1,
            title_case(term),
            count
        ));
    }
    out.push('\n');
}

fn discovered_topics(out: &mut String, inputs: &ReportInputs) {
    if inputs.topics.is_empty() {
        return;
    }

    out.push_str("## Discovered Research Topics\n\n");
    for topic in inputs.topics {
        out.push_str(&format!("### Topic {}\n\n", topic.id));

        let terms: Vec<&str> = topic
            .top_terms
            .iter()
            .take(TERMS_PER_TOPIC)
            .map(|(t, _)| t.as_str())
            .collect();
        out.push_str(&format!("**Key terms:** {}\n\n", terms.join(", ")));
        out.push_str(&format!(
            "**Documents in this topic:** {}\n\n",
            topic.member_count()
        ));

        if !topic.example_files.is_empty() {
            out.push_str("**Example publications:**\n");
            for file in &topic.example_files {
                out.push_str(&format!("- {file}\n"));
            }
            out.push('\n');
        }
    }

    if inputs.decomposition_used {
        out.push_str(
            "*Term-matrix decomposition was used for topic discovery. For embedding-based \
             clustering, run `landscape download-model` first.*\n\n",
        );
    }
}

fn policy_areas(out: &mut String, inputs: &ReportInputs) {
    out.push_str("## Key Areas for Public Policy\n\n");
    out.push_str("Based on this landscape analysis, the following research areas are prominent:\n\n");

    for area in inputs.areas {
        if area.score <= inputs.significance_threshold {
            continue;
        }
        out.push_str(&format!("### {}\n", area.name));
        out.push_str(&format!(
            "*Relevance score: {} term occurrences*\n\n",
            area.score
        ));
        let leading: Vec<&str> = area.keywords.iter().take(4).map(String::as_str).collect();
        out.push_str(&format!(
            "This area focuses on {} and related concepts.\n\n",
            leading.join(", ")
        ));
    }
}

fn visualizations(out: &mut String) {
    out.push_str("## Visualizations\n\n");
    out.push_str("The following visualizations are available in the `visualizations/` folder:\n\n");
    out.push_str("1. **Top Terms Chart** - Bar chart of the most common terms\n");
    out.push_str("2. **Document Length Distribution** - Histogram of document sizes\n");
    out.push_str("3. **Topic Distribution** - Distribution of documents across topics\n\n");
}

fn recommendations(out: &mut String) {
    out.push_str("## Recommendations for Further Research\n\n");
    out.push_str(
        "1. **Deep Dive into Specific Topics** - Use the topic assignments to cluster related research\n",
    );
    out.push_str("2. **Citation Network Analysis** - Map relationships between publications\n");
    out.push_str("3. **Temporal Analysis** - Track evolution of themes over time\n");
    out.push_str("4. **Policy Gap Analysis** - Identify under-researched policy areas\n");
    out.push_str(
        "5. **Stakeholder Mapping** - Analyze author networks and institutional affiliations\n\n",
    );
}

fn data_files(out: &mut String) {
    out.push_str("## Available Data Files\n\n");
    out.push_str("- `data/extracted_texts.json` - Full text of all documents\n");
    out.push_str("- `data/corpus_statistics.json` - Detailed statistics\n");
    out.push_str("- `data/topic_assignments.csv` - Document-topic mappings\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> CorpusStatistics {
        CorpusStatistics {
            total_documents: 3,
            total_words: 120,
            avg_words: 40.0,
            median_words: 38.0,
            min_words: 20,
            max_words: 60,
            unique_terms: 45,
            top_terms: vec![
                ("governance".to_string(), 12),
                ("fairness".to_string(), 9),
            ],
        }
    }

    fn sample_topic() -> Topic {
        Topic {
            id: 1,
            top_terms: vec![
                ("autonomy".to_string(), 3.2),
                ("vehicle".to_string(), 2.1),
            ],
            member_ids: vec![0, 2],
            example_files: vec!["paper_one.pdf".to_string()],
        }
    }

    fn sample_areas() -> Vec<AreaScore> {
        vec![
            AreaScore {
                name: "AI Governance & Regulation".to_string(),
                keywords: vec!["regulation".to_string(), "policy".to_string()],
                score: 80,
            },
            AreaScore {
                name: "AI Applications".to_string(),
                keywords: vec!["healthcare".to_string()],
                score: 5,
            },
        ]
    }

    fn render_with(decomposition_used: bool, topics: &[Topic]) -> String {
        let stats = sample_stats();
        let areas = sample_areas();
        render(&ReportInputs {
            stats: &stats,
            topics,
            areas: &areas,
            skipped: 1,
            model_name: "term-matrix decomposition",
            decomposition_used,
            significance_threshold: 50,
            generated: Local::now(),
        })
    }

    #[test]
    fn report_carries_all_sections() {
        let report = render_with(false, &[sample_topic()]);
        for heading in [
            "# AI Research Landscape Assessment",
            "## Executive Summary",
            "## Key Research Themes",
            "## Discovered Research Topics",
            "## Key Areas for Public Policy",
            "## Visualizations",
            "## Recommendations for Further Research",
            "## Available Data Files",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn themes_are_ranked_and_title_cased() {
        let report = render_with(false, &[]);
        assert!(report.contains("1. **Governance** (12 occurrences)"));
        assert!(report.contains("2. **Fairness** (9 occurrences)"));
    }

    #[test]
    fn insignificant_areas_are_filtered() {
        let report = render_with(false, &[]);
        assert!(report.contains("### AI Governance & Regulation"));
        assert!(!report.contains("### AI Applications"));
    }

    #[test]
    fn topic_section_lists_terms_and_examples() {
        let report = render_with(false, &[sample_topic()]);
        assert!(report.contains("### Topic 1"));
        assert!(report.contains("**Key terms:** autonomy, vehicle"));
        assert!(report.contains("- paper_one.pdf"));
    }

    #[test]
    fn no_topics_means_no_topic_section() {
        let report = render_with(false, &[]);
        assert!(!report.contains("## Discovered Research Topics"));
    }

    #[test]
    fn decomposition_note_only_in_fallback_mode() {
        let with_note = render_with(true, &[sample_topic()]);
        assert!(with_note.contains("Term-matrix decomposition was used"));
        let without = render_with(false, &[sample_topic()]);
        assert!(!without.contains("Term-matrix decomposition was used"));
    }

    #[test]
    fn skipped_count_appears_when_nonzero() {
        let report = render_with(false, &[]);
        assert!(report.contains("**Documents skipped during extraction:** 1"));
    }
}
