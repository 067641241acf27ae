//! Practice sub-session: a bounded drill entered after a wrong answer.

use rand::Rng;

use crate::models::{Difficulty, Question};
use crate::protocol::{ActionData, PracticeProgress};

/// Number of difficulty levels a full drill walks through.
pub const PRACTICE_TARGET_LEVELS: u32 = 3;

/// State of an active practice drill. Created from a `start-adaptive-mode`
/// response and folded back into the parent session (or discarded) on exit;
/// it never outlives the session.
#[derive(Debug, Clone)]
pub struct PracticeSubSession {
    /// Pending questions, normalized from either server shape (single
    /// question or pre-generated batch) into one queue.
    questions: Vec<Question>,
    index: usize,
    progress: PracticeProgress,
    /// Set once the mastery reward has been granted, so it is paid exactly
    /// once per drill.
    pub rewarded: bool,
}

impl PracticeSubSession {
    /// Normalize a `start-adaptive-mode` payload. Returns `None` when the
    /// response carries neither a batch nor a single question.
    pub fn from_start_response<R: Rng + ?Sized>(
        data: &ActionData,
        rng: &mut R,
    ) -> Option<Self> {
        let questions: Vec<Question> = match (&data.questions, &data.question) {
            (Some(batch), _) if !batch.is_empty() => {
                batch.iter().map(|q| q.shuffled(rng)).collect()
            }
            (_, Some(single)) => vec![single.shuffled(rng)],
            _ => return None,
        };

        let progress = data.progress.unwrap_or(PracticeProgress {
            current: 1,
            total: PRACTICE_TARGET_LEVELS,
        });

        Some(Self {
            questions,
            index: 0,
            progress,
            rewarded: false,
        })
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.index]
    }

    pub fn progress(&self) -> PracticeProgress {
        self.progress
    }

    /// Whether the local queue has an unseen question after the current one.
    pub fn has_next_local(&self) -> bool {
        self.index + 1 < self.questions.len()
    }

    /// Advance to the next pre-fetched question without a server round trip.
    pub fn advance_local(&mut self) {
        debug_assert!(self.has_next_local());
        self.index += 1;
        self.progress.current = (self.index as u32 + 1).min(self.progress.total);
    }

    /// Replace the current question with one the server generated directly
    /// (a difficulty step-up).
    pub fn set_generated<R: Rng + ?Sized>(
        &mut self,
        question: Question,
        progress: Option<PracticeProgress>,
        difficulty: Option<Difficulty>,
        rng: &mut R,
    ) {
        self.questions[self.index] = question.shuffled(rng);
        self.progress = progress.unwrap_or(PracticeProgress {
            current: match difficulty {
                Some(Difficulty::Hard) => 3,
                Some(Difficulty::Medium) => 2,
                _ => self.progress.current,
            },
            total: self.progress.total,
        });
    }
}
