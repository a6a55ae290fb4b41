use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::render::ChartSpec;

/// Bar values are integers; scores in [0, 1] are drawn in thousandths.
const SCALE: f64 = 1000.0;

pub const SERIES_COLORS: [Color; 3] = [Color::Cyan, Color::Green, Color::Yellow];

pub fn scaled(value: f64, spec: &ChartSpec) -> u64 {
    let span = (spec.y_axis.max - spec.y_axis.min).max(f64::EPSILON);
    let clamped = value.clamp(spec.y_axis.min, spec.y_axis.max);
    (((clamped - spec.y_axis.min) / span) * SCALE).round() as u64
}

/// Legend line: one colored swatch per series.
pub fn legend(spec: &ChartSpec) -> Line<'static> {
    let mut spans = Vec::new();
    for (series, color) in spec.series.iter().zip(SERIES_COLORS) {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled("■ ", Style::default().fg(color)));
        spans.push(Span::raw(series.label));
    }
    Line::from(spans)
}

/// Draw the grouped sub-score chart: one group per profile, three bars per group.
pub fn render_grouped_scores(f: &mut Frame, area: Rect, spec: &ChartSpec) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(area);

    // Y-axis labels on the left, aligned with the chart's inner area.
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(rows[0]);
    let label_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // border offset
            Constraint::Length(1), // max
            Constraint::Min(0),    // spacer
            Constraint::Length(2), // min, above the group labels
            Constraint::Length(1), // border offset
        ])
        .split(cols[0]);
    f.render_widget(
        Paragraph::new(format!("{:>4.1}", spec.y_axis.max)).style(Style::default().fg(Color::Gray)),
        label_layout[1],
    );
    f.render_widget(
        Paragraph::new(format!("{:>4.1}", spec.y_axis.min)).style(Style::default().fg(Color::Gray)),
        label_layout[3],
    );

    let groups = spec.len().max(1) as u16;
    let inner_width = cols[1].width.saturating_sub(2);
    let group_gap = 2u16;
    let per_group = (inner_width / groups).saturating_sub(group_gap);
    let bar_width = (per_group / 3).max(1);

    let mut chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Score breakdown"))
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(group_gap)
        .max(SCALE as u64);

    for (idx, label) in spec.labels.iter().enumerate() {
        let Some(values) = spec.group(idx) else {
            continue;
        };
        let bars: Vec<Bar> = values
            .iter()
            .zip(SERIES_COLORS)
            .map(|(v, color)| {
                Bar::default()
                    .value(scaled(*v, spec))
                    .text_value(format!("{:.2}", v))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(label.clone()))
                .bars(&bars),
        );
    }

    f.render_widget(chart, cols[1]);
    f.render_widget(Paragraph::new(legend(spec)), rows[1]);
}
