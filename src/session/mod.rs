//! Session layer: the quiz state machine and its side-effect protocol.

mod controller;
mod effect;
mod practice;

pub use controller::{Phase, QuizSession, QUESTION_TIME_SECS};
pub use effect::{CallKind, Effect, PendingCall};
pub use practice::{PracticeSubSession, PRACTICE_TARGET_LEVELS};
