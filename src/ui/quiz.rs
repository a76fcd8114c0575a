use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, Feedback};
use crate::models::Candidate;
use crate::session::FLAGS_PER_ROUND;

const OPTION_LABELS: [char; 9] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I'];

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], question.number());
    render_flag(frame, chunks[1], question.correct());
    render_choices(frame, chunks[3], app);
    render_feedback(frame, chunks[4], app.feedback());
    render_controls(frame, chunks[5]);
}

fn render_progress(frame: &mut Frame, area: Rect, number: usize) {
    let progress = format!("Flag {}/{}", number, FLAGS_PER_ROUND);
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_flag(frame: &mut Frame, area: Rect, candidate: &Candidate) {
    let content = vec![
        Line::from(Span::styled(
            flag_glyph(&candidate.code),
            Style::default().bold(),
        )),
        Line::from(""),
        Line::from("Which country flies this flag?".fg(Color::White)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

/// The Unicode flag for a two-letter country code, with the bare uppercase
/// code as a fallback for anything a regional-indicator pair can't express.
fn flag_glyph(code: &str) -> String {
    let indicators: Option<String> = code
        .chars()
        .map(|c| {
            c.is_ascii_lowercase()
                .then(|| char::from_u32(0x1F1E6 + (c as u32 - 'a' as u32)))
                .flatten()
        })
        .collect();

    match indicators {
        Some(flag) if code.len() == 2 => flag,
        _ => format!("[{}]", code.to_uppercase()),
    }
}

fn render_choices(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.question() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::with_capacity(question.choices().len());
    // Three choices per row, as many rows as the choice count calls for.
    for (row, chunk) in question.choices().chunks(3).enumerate() {
        let mut spans: Vec<Span> = Vec::with_capacity(chunk.len() * 2);
        for (column, candidate) in chunk.iter().enumerate() {
            let index = row * 3 + column;
            spans.push(Span::styled(
                format!("  {} ", option_marker(app, index)),
                option_style(app, index),
            ));
            spans.push(Span::styled(
                format!("{}. {}", OPTION_LABELS[index], candidate.name),
                option_style(app, index),
            ));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn option_marker(app: &App, index: usize) -> &'static str {
    if index == app.selected() && !app.is_locked() {
        ">"
    } else {
        " "
    }
}

fn option_style(app: &App, index: usize) -> Style {
    if app.is_disabled(index) {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if app.is_locked() {
        Style::default().fg(Color::DarkGray)
    } else if index == app.selected() {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: Option<&Feedback>) {
    let line = match feedback {
        Some(Feedback::Correct(name)) => Line::from(Span::styled(
            format!("{}!", name),
            Style::default().fg(Color::Green).bold(),
        )),
        Some(Feedback::Incorrect) => Line::from(Span::styled(
            "Incorrect!",
            Style::default().fg(Color::Red).bold(),
        )),
        None => Line::from(""),
    };

    let widget = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k navigate  ·  enter guess  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
