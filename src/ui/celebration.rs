//! Celebration screens for mastery and finished practice drills.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::session::QuizSession;

pub fn render_mastery(frame: &mut Frame, area: Rect, session: &QuizSession) {
    render_banner(
        frame,
        area,
        vec![
            Line::from(Span::styled(
                "🏆 CONCEPT MASTERED! 🏆",
                Style::default().fg(Color::Yellow).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                session.encouragement().unwrap_or(""),
                Style::default().fg(Color::Magenta),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "+50 ⭐",
                Style::default().fg(Color::Yellow).bold(),
            )),
        ],
    );
}

pub fn render_practice_complete(frame: &mut Frame, area: Rect, session: &QuizSession) {
    render_banner(
        frame,
        area,
        vec![
            Line::from(Span::styled(
                "Practice Complete! 🎉",
                Style::default().fg(Color::Green).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                session.encouragement().unwrap_or(""),
                Style::default().fg(Color::Magenta),
            )),
            Line::from(""),
            Line::from(Span::styled("+20 ⭐", Style::default().fg(Color::Yellow))),
        ],
    );
}

fn render_banner(frame: &mut Frame, area: Rect, mut content: Vec<Line>) {
    let chunks = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(10),
        Constraint::Percentage(35),
    ])
    .split(area);

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "b back to quiz  ·  q quit",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
