//! Quiz screen: question, options, countdown, and progress.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::session::{Phase, QuizSession};
use crate::student::StudentProgress;

const OPTION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];
const LOW_TIME_SECS: u32 = 10;

pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, student: &StudentProgress) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header: progress, score, stars, timer
        Constraint::Length(7), // Question text
        Constraint::Min(8),    // Options
        Constraint::Length(2), // Encouragement
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], session, student);
    render_question_text(frame, chunks[1], session);
    render_options(frame, chunks[2], session);
    render_encouragement(frame, chunks[3], session);
    render_controls(frame, chunks[4], session);
}

fn render_header(frame: &mut Frame, area: Rect, session: &QuizSession, student: &StudentProgress) {
    let progress = if let Some(practice) = session.practice_progress() {
        format!("PRACTICE  Level {} of {}", practice.current, practice.total)
    } else {
        format!(
            "Question {} of {}",
            session.question_number(),
            session.total_questions()
        )
    };

    let timer_color = if session.time_left() <= LOW_TIME_SECS {
        Color::Red
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(progress, Style::default().fg(Color::Cyan).bold()),
        Span::raw("    "),
        Span::styled(
            format!("Score {}", session.score()),
            Style::default().fg(Color::White),
        ),
        Span::raw("    "),
        Span::styled(
            format!("⭐ {}", student.stars),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("    "),
        Span::styled(
            format!("⏱ {:2}s", session.time_left()),
            Style::default().fg(timer_color).bold(),
        ),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let question = session.current_question();
    let title = if session.is_practice_mode() {
        " Practice Question "
    } else {
        " Question "
    };

    let widget = Paragraph::new(question.prompt.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title)
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let question = session.current_question();
    let selected = session.selected();
    let answered_correctly = session.is_correct() == Some(true);

    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let is_cursor = i == session.cursor() && selected.is_none();
            let is_selected = selected == Some(i);
            let prefix = if is_cursor { "> " } else { "  " };
            let label = OPTION_LABELS.get(i).copied().unwrap_or('?');

            let style = if is_selected && option.correct {
                Style::default().fg(Color::Green).bold()
            } else if is_selected {
                Style::default().fg(Color::Red).bold()
            } else if answered_correctly && option.correct {
                // Reveal the right answer once the question is settled.
                Style::default().fg(Color::Green)
            } else if is_cursor {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            let text = match &option.emoji {
                Some(emoji) => format!("{} {}", emoji, option.text),
                None => option.text.clone(),
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{}) ", label), style),
                Span::styled(text, style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_encouragement(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let Some(message) = session.encouragement() else {
        return;
    };

    let widget = Paragraph::new(message)
        .alignment(Alignment::Center)
        .fg(Color::Magenta);
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let text = match session.phase() {
        Phase::AnsweredCorrect => "n next question  ·  q quit",
        Phase::AnsweredWrong => "j/k or arrows to select  ·  Enter to try again  ·  q quit",
        Phase::PracticeCorrectPending | Phase::PracticeStartPending => "checking...",
        Phase::TimedOut { .. } => "moving on...",
        _ => "j/k or arrows to select  ·  Enter/Space to submit  ·  q quit",
    };

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
