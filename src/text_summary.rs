//! Text summary builder for CLI output.
//!
//! Formats a rendered dashboard as human-readable lines for text mode and the clipboard.

use crate::model::AnalysisResult;
use crate::render::{DashboardView, SERIES_LABELS};
use anyhow::{Context, Result};

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

impl TextSummary {
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Build a text summary from a populated dashboard and the result it came from.
pub fn build_text_summary(
    view: &DashboardView,
    result: &AnalysisResult,
    completed_at: Option<&str>,
) -> Result<TextSummary> {
    let mut lines = Vec::new();

    let metadata = view
        .metadata
        .as_deref()
        .context("dashboard has no metadata; nothing was rendered")?;
    lines.push(metadata.to_string());
    if let Some(credits) = result.total_credits {
        lines.push(format!("Total credits: {credits}"));
    }

    let top = view.top.as_ref().context("dashboard has no top match")?;
    lines.push(String::new());
    lines.push(format!("Top match: {} ({})", top.profile, top.score_text));
    lines.push(format!("  {}", top.explanation));

    lines.push(String::new());
    lines.push("Ranking:".to_string());
    for row in &view.rows {
        lines.push(format!("  {row}"));
        if !row.explanation.is_empty() {
            lines.push(format!("     {}", row.explanation));
        }
    }

    if let Some(chart) = view.chart.as_ref() {
        lines.push(String::new());
        lines.push(format!(
            "{:<12} {:>17} {:>17} {:>14}",
            "Profile", SERIES_LABELS[0], SERIES_LABELS[1], SERIES_LABELS[2]
        ));
        for (idx, label) in chart.labels.iter().enumerate() {
            if let Some([f, c, d]) = chart.group(idx) {
                lines.push(format!("{label:<12} {f:>17.4} {c:>17.4} {d:>14.4}"));
            }
        }
    }

    if let Some(ts) = completed_at {
        lines.push(String::new());
        lines.push(format!("Completed: {ts}"));
    }

    Ok(TextSummary { lines })
}
