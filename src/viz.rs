// Chart rendering for the report's visualizations folder.
//
// Plain PNG bar charts and a histogram, drawn pixel by pixel. No text
// labels; the report's markdown carries the legend for each chart.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use tracing::info;

use crate::corpus::CorpusStore;
use crate::stats::CorpusStatistics;
use crate::topics::OUTLIER_TOPIC_ID;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TEAL: Rgb<u8> = Rgb([0, 128, 128]);
const STEEL_BLUE: Rgb<u8> = Rgb([70, 130, 180]);
const CORAL: Rgb<u8> = Rgb([255, 127, 80]);

const HISTOGRAM_BINS: usize = 20;

/// Render all charts for one run into `viz_dir`.
pub fn render_all(viz_dir: &Path, corpus: &CorpusStore, stats: &CorpusStatistics) -> Result<()> {
    std::fs::create_dir_all(viz_dir).with_context(|| {
        format!(
            "Failed to create visualizations directory: {}",
            viz_dir.display()
        )
    })?;

    let term_counts: Vec<usize> = stats.top_terms.iter().map(|(_, c)| *c).collect();
    save_chart(
        &bar_chart(&term_counts, TEAL),
        &viz_dir.join("top_words.png"),
    )?;

    let word_counts: Vec<usize> = corpus.documents().iter().map(|d| d.word_count).collect();
    save_chart(
        &bar_chart(&histogram(&word_counts, HISTOGRAM_BINS), STEEL_BLUE),
        &viz_dir.join("document_lengths.png"),
    )?;

    save_chart(
        &bar_chart(&topic_member_counts(corpus), CORAL),
        &viz_dir.join("topic_distribution.png"),
    )?;

    info!("Visualizations written to {}", viz_dir.display());
    Ok(())
}

fn save_chart(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path)
        .with_context(|| format!("Failed to write chart {}", path.display()))
}

/// Documents per topic, in ascending topic-id order, outlier bucket
/// first when present.
fn topic_member_counts(corpus: &CorpusStore) -> Vec<usize> {
    let mut ids: Vec<i32> = corpus
        .documents()
        .iter()
        .map(|d| d.topic.unwrap_or(OUTLIER_TOPIC_ID))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    ids.iter()
        .map(|&id| {
            corpus
                .documents()
                .iter()
                .filter(|d| d.topic.unwrap_or(OUTLIER_TOPIC_ID) == id)
                .count()
        })
        .collect()
}

/// Bucket values into a fixed number of equal-width bins.
fn histogram(values: &[usize], bins: usize) -> Vec<usize> {
    if values.is_empty() {
        return vec![0; bins];
    }
    let min = *values.iter().min().unwrap_or(&0);
    let max = *values.iter().max().unwrap_or(&0);
    let span = (max - min).max(1);

    let mut counts = vec![0usize; bins];
    for &v in values {
        let bin = ((v - min) * bins / (span + 1)).min(bins - 1);
        counts[bin] += 1;
    }
    counts
}

/// Vertical bar chart over a white canvas. Bars share the plot width
/// evenly with a one-bar-tenth gap; heights scale to the maximum value.
fn bar_chart(values: &[usize], color: Rgb<u8>) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    if values.is_empty() {
        return img;
    }

    let max = *values.iter().max().unwrap_or(&1);
    if max == 0 {
        return img;
    }

    let plot_width = WIDTH - 2 * MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;
    let slot = plot_width / values.len() as u32;
    let gap = (slot / 10).max(1);
    let bar_width = slot.saturating_sub(gap).max(1);

    for (i, &value) in values.iter().enumerate() {
        let bar_height = (value as f64 / max as f64 * plot_height as f64) as u32;
        let x0 = MARGIN + i as u32 * slot;
        let y0 = HEIGHT - MARGIN - bar_height;

        for x in x0..(x0 + bar_width).min(WIDTH) {
            for y in y0..(HEIGHT - MARGIN) {
                img.put_pixel(x, y, color);
            }
        }
    }

    img
}
