mod charts;
mod export;
mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::model::{ActiveView, SubmitEvent, SubmitState};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Terminal,
};
use state::{Field, KeyAction, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub async fn run(args: Cli) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SubmitEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let cfg = build_config(&args);

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, event_rx, cmd_tx));

    let res = orchestrator::run_http_controller(&cfg, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<SubmitEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::with_form(&args.form());
    state.endpoint = args.endpoint.clone();
    if args.submit_on_launch {
        if let KeyAction::Submit(form) = state.fire_trigger() {
            let _ = cmd_tx.send(UiCommand::Submit(form));
        }
    }

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut frame: usize = 0;

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            frame = frame.wrapping_add(1);
            terminal.draw(|f| draw(f.area(), f, &state, frame)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(k) {
                    KeyAction::None => {}
                    KeyAction::Submit(form) => {
                        state.info = "Submitting…".into();
                        let _ = cmd_tx.send(UiCommand::Submit(form));
                    }
                    KeyAction::NewCycle => {
                        let _ = cmd_tx.send(UiCommand::NewCycle);
                    }
                    KeyAction::CopySummary => export::copy_summary(&mut state),
                    KeyAction::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, frame: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    if state.show_help {
        help::draw_help(chunks[0], f);
    } else {
        match state.view.active_view {
            ActiveView::Submission => draw_form(chunks[0], f, state, frame),
            ActiveView::Results => draw_results(chunks[0], f, state),
        }
    }
    draw_status(chunks[1], f, state);
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, state: &UiState, frame: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("AHP Student Profiler");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = Field::ALL.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(3)); // trigger
    constraints.push(Constraint::Length(3)); // error
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, field) in Field::ALL.iter().enumerate() {
        let focused = state.focus == *field;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut text = state.field_value(*field).to_string();
        if focused && state.view.trigger_enabled {
            text.push('▏');
        }
        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(field.label()),
        );
        f.render_widget(input, rows[idx]);
    }

    let trigger_idx = Field::ALL.len();
    let (label, style) = if state.view.trigger_enabled {
        (
            format!("[ {} ]", state.view.trigger_label.text()),
            Style::default().fg(Color::Black).bg(Color::Green),
        )
    } else {
        (
            format!(
                "{} {}",
                SPINNER[frame % SPINNER.len()],
                state.view.trigger_label.text()
            ),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(label, style)))
            .block(Block::default().borders(Borders::ALL)),
        rows[trigger_idx],
    );

    if let Some(err) = state.view.error.as_deref() {
        f.render_widget(
            Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Error")),
            rows[trigger_idx + 1],
        );
    }
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let dash = &state.dashboard;
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Metadata
                Constraint::Length(5), // Top match
                Constraint::Min(10),   // Ranking + chart
            ]
            .as_ref(),
        )
        .split(area);

    let mut metadata = dash.metadata.clone().unwrap_or_default();
    if let Some(credits) = state.total_credits() {
        metadata.push_str(&format!(" | Credits: {credits}"));
    }
    f.render_widget(
        Paragraph::new(metadata).block(Block::default().borders(Borders::ALL).title("Student")),
        main[0],
    );

    let top_lines = match dash.top.as_ref() {
        Some(top) => vec![
            Line::from(vec![
                Span::styled(
                    top.profile.clone(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(top.score_text.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(top.explanation.clone()),
        ],
        None => vec![Line::from("Waiting for results...")],
    };
    f.render_widget(
        Paragraph::new(top_lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Top match")),
        main[1],
    );

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(main[2]);

    let ranking = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(6)].as_ref())
        .split(lower[0]);

    let items: Vec<ListItem> = dash
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let item = ListItem::new(Line::from(vec![
                Span::raw(row.label.clone()),
                Span::raw(" — "),
                Span::styled(row.score_text.clone(), Style::default().fg(Color::Cyan)),
            ]));
            if idx == state.selected_row {
                item.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title("Ranking (↑/↓)")),
        ranking[0],
    );

    let (title, explanation) = match state.selected() {
        Some(row) => (format!("Why {}", row.label), row.explanation.clone()),
        None => ("Why".to_string(), String::new()),
    };
    f.render_widget(
        Paragraph::new(explanation)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title)),
        ranking[1],
    );

    match dash.chart.as_ref() {
        Some(chart) => charts::render_grouped_scores(f, lower[1], chart),
        None => f.render_widget(
            Paragraph::new("No chart").block(Block::default().borders(Borders::ALL)),
            lower[1],
        ),
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let (state_text, color) = match state.submit_state {
        SubmitState::Idle => ("idle", Color::Gray),
        SubmitState::Submitting => ("submitting", Color::Yellow),
        SubmitState::Success => ("done", Color::Green),
        SubmitState::Failed => ("failed", Color::Red),
    };
    let line = Line::from(vec![
        Span::styled(state_text, Style::default().fg(color)),
        Span::raw(" | "),
        Span::styled(state.endpoint.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::raw(state.info.clone()),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Status (F1 help)")),
        area,
    );
}
