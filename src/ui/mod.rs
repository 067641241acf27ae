//! TUI renderer, one module per screen.

mod celebration;
mod explanation;
mod quiz;
mod result;

use ratatui::prelude::*;
use ratatui::widgets::Block;

use crate::session::{Phase, QuizSession};
use crate::student::StudentProgress;

/// Render the UI for the session's current phase.
pub fn render(frame: &mut Frame, session: &QuizSession, student: &StudentProgress) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match session.phase() {
        Phase::Idle
        | Phase::AnsweredCorrect
        | Phase::AnsweredWrong
        | Phase::TimedOut { .. }
        | Phase::PracticeCorrectPending
        | Phase::PracticeStartPending => {
            quiz::render(frame, area, session, student);
        }
        Phase::WrongPending => {
            quiz::render(frame, area, session, student);
            explanation::render_loading(frame, area);
        }
        Phase::Explanation {
            explanation,
            correct_answer,
        } => {
            quiz::render(frame, area, session, student);
            explanation::render(frame, area, explanation, correct_answer);
        }
        Phase::PracticeMastery => celebration::render_mastery(frame, area, session),
        Phase::PracticeComplete => celebration::render_practice_complete(frame, area, session),
        Phase::Complete => result::render(frame, area, session, student),
    }
}

/// Centered rectangle for modal overlays.
fn modal_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
