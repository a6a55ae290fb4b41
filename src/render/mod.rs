//! Dashboard rendering.
//!
//! Turns an [`AnalysisResult`] into a [`RenderPlan`]: a metadata line, the top match,
//! the ranked list and a grouped bar chart description. Presentation layers receive the
//! plan through a [`DashboardSink`] and never see the raw response.

mod chart;
mod sink;

pub use chart::{ChartKind, ChartSeries, ChartSpec, ValueAxis, SERIES_LABELS};
pub use sink::{DashboardSink, DashboardUpdate, DashboardView, EventSink};

use crate::error::RenderError;
use crate::model::{ActiveView, AnalysisResult, Recommendation, StudentMetadata};
use serde::Serialize;

/// Which view to hide and which to show once a result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSwitch {
    pub hide: ActiveView,
    pub show: ActiveView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopHighlight {
    pub profile: String,
    pub score_text: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub label: String,
    pub score_text: String,
    pub explanation: String,
}

impl std::fmt::Display for RankingRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.label, self.score_text)
    }
}

/// Everything a presentation layer needs to draw the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub view: ViewSwitch,
    pub metadata: String,
    pub top: TopHighlight,
    pub rows: Vec<RankingRow>,
    pub chart: ChartSpec,
}

impl RenderPlan {
    /// Push every region of the plan into `sink`, replacing what it held before.
    pub fn apply_to<S: DashboardSink + ?Sized>(&self, sink: &mut S) {
        sink.show_view(self.view.show);
        sink.set_metadata(&self.metadata);
        sink.set_top_highlight(&self.top);
        sink.replace_ranking(&self.rows);
        sink.replace_chart(&self.chart);
    }
}

/// Build the render plan for `result`.
///
/// Recommendations must arrive best-first with ranks 1..=n; the first entry becomes the
/// top highlight without any re-sorting.
pub fn render(result: &AnalysisResult) -> Result<RenderPlan, RenderError> {
    let first = result
        .recommendations
        .first()
        .ok_or(RenderError::EmptyRecommendations)?;
    check_rank_order(&result.recommendations)?;

    Ok(RenderPlan {
        view: ViewSwitch {
            hide: ActiveView::Submission,
            show: ActiveView::Results,
        },
        metadata: format_metadata(&result.student_metadata),
        top: top_highlight(first),
        rows: result.recommendations.iter().map(ranking_row).collect(),
        chart: ChartSpec::from_recommendations(&result.recommendations),
    })
}

fn check_rank_order(recs: &[Recommendation]) -> Result<(), RenderError> {
    for (position, rec) in recs.iter().enumerate() {
        let expected = position as u32 + 1;
        if rec.rank != expected {
            return Err(RenderError::RankOrder {
                position,
                expected,
                found: rec.rank,
            });
        }
    }
    Ok(())
}

pub fn format_metadata(meta: &StudentMetadata) -> String {
    let name = meta.name.as_deref().unwrap_or("N/A");
    let id = meta.id.as_deref().unwrap_or("N/A");
    let gpa = meta
        .gpa
        .map(|g| g.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!("{name} | ID: {id} | GPA: {gpa}")
}

pub fn format_match_percent(score: f64) -> String {
    format!("{:.1}% Match", score * 100.0)
}

pub fn format_score(score: f64) -> String {
    format!("{:.4}", score)
}

fn top_highlight(rec: &Recommendation) -> TopHighlight {
    TopHighlight {
        profile: rec.profile.clone(),
        score_text: format_match_percent(rec.score),
        explanation: rec.explanation.clone(),
    }
}

fn ranking_row(rec: &Recommendation) -> RankingRow {
    RankingRow {
        label: format!("{}. {}", rec.rank, rec.profile),
        score_text: format_score(rec.score),
        explanation: rec.explanation.clone(),
    }
}
