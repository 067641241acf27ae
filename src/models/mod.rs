//! Domain types shared by content, protocol, and the session controller.

mod question;

pub use question::{AnswerOption, Difficulty, Question, QuestionId, Subject};
