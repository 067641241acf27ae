//! Session-complete summary screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::session::QuizSession;
use crate::student::StudentProgress;

pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, student: &StudentProgress) {
    let score = session.score();
    let total = session.total_questions();
    let (percentage, grade_color) = grade(score, total);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(
        frame, chunks[1], session, score, total, percentage, grade_color,
    );
    render_progress_summary(frame, chunks[2], student);
    render_controls(frame, chunks[3]);
}

fn grade(score: usize, total: usize) -> (f64, Color) {
    let percentage = if total > 0 {
        score as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let color = match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    };
    (percentage, color)
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    session: &QuizSession,
    score: usize,
    total: usize,
    percentage: f64,
    grade_color: Color,
) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUIZ COMPLETE! 🎊",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            session.quiz_set_name().to_string(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.0}%)", score, total, percentage),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_progress_summary(frame: &mut Frame, area: Rect, student: &StudentProgress) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("⭐ {} stars", student.stars),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} topics completed", student.completed_topics.len()),
            Style::default().fg(Color::Green),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
