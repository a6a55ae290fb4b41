use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("Ctrl-C", 6, "Quit"),
        key_line("F1", 10, "Toggle this help"),
        Line::from(""),
        Line::from("Submission form:"),
        key_line("Tab/↓", 7, "Next field"),
        key_line("S-Tab/↑", 5, "Previous field"),
        key_line("Enter", 7, "Analyze transcript"),
        key_line("Esc", 9, "Quit"),
        Line::from(""),
        Line::from("Results:"),
        key_line("↑/↓ j/k", 5, "Select ranking row"),
        key_line("n", 11, "New analysis"),
        key_line("c", 11, "Copy summary to clipboard"),
        key_line("?", 11, "Show this help"),
        key_line("q", 11, "Quit"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
