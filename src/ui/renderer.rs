use crate::core::controller::Controller;
use crate::core::history::HISTORY_LIMIT;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Per-frame data that lives outside the controller.
pub struct FrameInfo<'a> {
    pub transcript: &'a str,
    pub notice: Option<&'a str>,
    pub spinner: &'a str,
}

pub fn ui(f: &mut Frame, controller: &Controller, info: &FrameInfo<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(HISTORY_LIMIT as u16 + 2),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title(f, chunks[0], controller, info);
    render_status(f, chunks[1], controller, info);
    render_topic_input(f, chunks[2], controller);
    render_joke(f, chunks[3], controller, info);
    render_history(f, chunks[4], controller);
    render_hints(f, chunks[5], controller, info);
}

fn render_title(f: &mut Frame, area: Rect, controller: &Controller, info: &FrameInfo<'_>) {
    let model = controller
        .state()
        .model_name
        .as_deref()
        .unwrap_or("unknown model");
    let title = format!(
        "Jokebox v{} - {} ({}) • Transcript: {}",
        env!("CARGO_PKG_VERSION"),
        controller.endpoint(),
        model,
        info.transcript
    );
    let paragraph = Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, area: Rect, controller: &Controller, info: &FrameInfo<'_>) {
    let state = controller.state();
    let busy = state.model_loading || state.generating || state.checking_status;
    let (marker, color) = if busy {
        (info.spinner, Color::Yellow)
    } else if state.model_loaded {
        ("●", Color::Green)
    } else {
        ("○", Color::Red)
    };

    let mut spans = vec![
        Span::styled(format!("{marker} "), Style::default().fg(color)),
        Span::raw(controller.status_message().to_string()),
    ];
    if let Some(notice) = info.notice {
        spans.push(Span::styled(
            format!("  [{notice}]"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_topic_input(f: &mut Frame, area: Rect, controller: &Controller) {
    let input_style = if controller.can_generate() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(controller.topic_input())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Topic (leave empty for any joke)"),
        );
    f.render_widget(input, area);

    f.set_cursor_position((cursor_column(area, controller.topic_input()), area.y + 1));
}

/// Column just past the typed topic, clamped to the inside of the input box.
fn cursor_column(area: Rect, topic: &str) -> u16 {
    let width = u16::try_from(UnicodeWidthStr::width(topic)).unwrap_or(u16::MAX);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(1).saturating_add(width).min(max_x)
}

fn render_joke(f: &mut Frame, area: Rect, controller: &Controller, info: &FrameInfo<'_>) {
    let text = if controller.state().generating {
        Line::from(Span::styled(
            format!("{} Thinking of something funny...", info.spinner),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match controller.current_joke() {
            Some(joke) if joke.starts_with("Error:") => {
                Line::from(Span::styled(joke.to_string(), Style::default().fg(Color::Red)))
            }
            Some(joke) => Line::from(joke.to_string()),
            None => Line::from(Span::styled(
                "No joke yet.",
                Style::default().fg(Color::DarkGray),
            )),
        }
    };

    let joke = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Joke"))
        .wrap(Wrap { trim: true });
    f.render_widget(joke, area);
}

fn render_history(f: &mut Frame, area: Rect, controller: &Controller) {
    let lines: Vec<Line> = controller
        .history()
        .iter()
        .map(|record| {
            let topic = if record.topic.is_empty() {
                "any"
            } else {
                record.topic.as_str()
            };
            let first_line = record.joke.lines().next().unwrap_or_default();
            Line::from(vec![
                Span::styled(
                    format!("{} ", record.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("[{topic}] "), Style::default().fg(Color::Cyan)),
                Span::raw(first_line.to_string()),
            ])
        })
        .collect();

    let history = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Recent jokes (last {HISTORY_LIMIT})")),
    );
    f.render_widget(history, area);
}

fn hint(key: &str, label: &str, enabled: bool) -> Vec<Span<'static>> {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default(),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };
    vec![
        Span::styled(key.to_string(), key_style),
        Span::styled(format!(" {label}   "), label_style),
    ]
}

fn render_hints(f: &mut Frame, area: Rect, controller: &Controller, info: &FrameInfo<'_>) {
    let state = controller.state();
    let load_label = if state.model_loaded {
        "model loaded"
    } else if state.model_loading {
        "loading..."
    } else {
        "load model"
    };

    let mut spans = Vec::new();
    spans.extend(hint("Ctrl+L", load_label, controller.can_load()));
    spans.extend(hint("Enter", "tell a joke", controller.can_generate()));
    spans.extend(hint("Ctrl+P", "pause transcript", info.transcript != "off"));
    spans.extend(hint("Esc", "quit", true));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
