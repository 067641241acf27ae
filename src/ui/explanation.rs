//! Explanation modal shown after a wrong answer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::protocol::AiExplanation;

use super::modal_area;

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let modal = modal_area(area, 44, 5);
    frame.render_widget(Clear, modal);

    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "🦉 Thinking of a good explanation...",
            Style::default().fg(Color::Yellow),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(widget, modal);
}

pub fn render(frame: &mut Frame, area: Rect, explanation: &AiExplanation, correct_answer: &str) {
    let modal = modal_area(area, 60, 17);
    frame.render_widget(Clear, modal);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            explanation.encouragement.clone(),
            Style::default().fg(Color::Magenta).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            explanation.explanation.clone(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Example: {}", explanation.example),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!("Tip: {}", explanation.tip),
            Style::default().fg(Color::Cyan),
        )),
    ];

    if !correct_answer.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            format!("The answer was: {}", correct_answer),
            Style::default().fg(Color::Green).bold(),
        )));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "c continue  ·  p practice this concept",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Let's Learn! ")
                .title_style(Style::default().fg(Color::Magenta).bold())
                .padding(Padding::horizontal(2)),
        );
    frame.render_widget(widget, modal);
}
