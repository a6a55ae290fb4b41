use super::{ChartSpec, RankingRow, TopHighlight};
use crate::model::{ActiveView, SubmitEvent};
use tokio::sync::mpsc::UnboundedSender;

/// Output regions of the results dashboard.
///
/// Every setter replaces what the region held before; nothing is appended or diffed.
pub trait DashboardSink {
    fn show_view(&mut self, view: ActiveView);
    fn set_metadata(&mut self, text: &str);
    fn set_top_highlight(&mut self, top: &TopHighlight);
    fn replace_ranking(&mut self, rows: &[RankingRow]);
    fn replace_chart(&mut self, chart: &ChartSpec);
}

/// One region update, as carried across threads.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardUpdate {
    ShowView(ActiveView),
    Metadata(String),
    TopHighlight(TopHighlight),
    Ranking(Vec<RankingRow>),
    Chart(ChartSpec),
}

/// In-memory dashboard contents, used directly by the text and TUI layers.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub active_view: ActiveView,
    pub metadata: Option<String>,
    pub top: Option<TopHighlight>,
    pub rows: Vec<RankingRow>,
    pub chart: Option<ChartSpec>,
    /// Bumped on every chart replacement so consumers can drop cached drawings.
    pub chart_generation: u64,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            active_view: ActiveView::Submission,
            metadata: None,
            top: None,
            rows: Vec::new(),
            chart: None,
            chart_generation: 0,
        }
    }
}

impl DashboardView {
    pub fn apply_update(&mut self, update: DashboardUpdate) {
        match update {
            DashboardUpdate::ShowView(view) => self.show_view(view),
            DashboardUpdate::Metadata(text) => self.metadata = Some(text),
            DashboardUpdate::TopHighlight(top) => self.top = Some(top),
            DashboardUpdate::Ranking(rows) => self.rows = rows,
            DashboardUpdate::Chart(chart) => {
                self.chart = Some(chart);
                self.chart_generation += 1;
            }
        }
    }
}

impl DashboardSink for DashboardView {
    fn show_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }

    fn set_metadata(&mut self, text: &str) {
        self.metadata = Some(text.to_string());
    }

    fn set_top_highlight(&mut self, top: &TopHighlight) {
        self.top = Some(top.clone());
    }

    fn replace_ranking(&mut self, rows: &[RankingRow]) {
        self.rows.clear();
        self.rows.extend_from_slice(rows);
    }

    fn replace_chart(&mut self, chart: &ChartSpec) {
        self.chart = Some(chart.clone());
        self.chart_generation += 1;
    }
}

/// Forwards dashboard updates to a presentation layer on another thread.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<SubmitEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<SubmitEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, update: DashboardUpdate) {
        let _ = self.tx.send(SubmitEvent::Dashboard(update));
    }
}

impl DashboardSink for EventSink {
    fn show_view(&mut self, view: ActiveView) {
        self.send(DashboardUpdate::ShowView(view));
    }

    fn set_metadata(&mut self, text: &str) {
        self.send(DashboardUpdate::Metadata(text.to_string()));
    }

    fn set_top_highlight(&mut self, top: &TopHighlight) {
        self.send(DashboardUpdate::TopHighlight(top.clone()));
    }

    fn replace_ranking(&mut self, rows: &[RankingRow]) {
        self.send(DashboardUpdate::Ranking(rows.to_vec()));
    }

    fn replace_chart(&mut self, chart: &ChartSpec) {
        self.send(DashboardUpdate::Chart(chart.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::{alice, four_profiles};
    use crate::render::render;

    #[test]
    fn rerender_replaces_rows_and_chart() {
        let mut view = DashboardView::default();
        render(&four_profiles()).unwrap().apply_to(&mut view);
        assert_eq!(view.rows.len(), 4);
        assert_eq!(view.chart_generation, 1);

        render(&alice()).unwrap().apply_to(&mut view);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].label, "1. Data Science");
        assert_eq!(view.chart.as_ref().map(|c| c.len()), Some(1));
        assert_eq!(view.chart_generation, 2);
        assert_eq!(view.active_view, ActiveView::Results);
    }

    #[test]
    fn event_sink_round_trips_into_view() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut sink = EventSink::new(tx);
        let plan = render(&alice()).unwrap();
        plan.apply_to(&mut sink);
        drop(sink);

        let mut view = DashboardView::default();
        while let Ok(ev) = rx.try_recv() {
            if let SubmitEvent::Dashboard(update) = ev {
                view.apply_update(update);
            }
        }
        let mut direct = DashboardView::default();
        plan.apply_to(&mut direct);
        assert_eq!(view, direct);
    }
}
