use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::session::FLAGS_PER_ROUND;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(summary) = app.summary() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(10),
        Constraint::Fill(1),
    ])
    .split(area);

    let accuracy_color = grade_color(summary.accuracy);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "ROUND COMPLETE",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "{} flags · {} guesses",
            FLAGS_PER_ROUND, summary.total_guesses
        )
        .fg(Color::Gray)),
        Line::from(Span::styled(
            format!("{:.1}% accuracy", summary.accuracy),
            Style::default().fg(accuracy_color).bold(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from("r play again  ·  q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}

fn grade_color(accuracy: f64) -> Color {
    match accuracy as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}
