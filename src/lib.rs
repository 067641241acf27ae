//! # adaptive-quiz
//!
//! A terminal quiz app for young students, backed by an adaptive learning
//! service. Wrong answers fetch an AI-written explanation and can branch
//! into a short practice drill; the service decides difficulty through a
//! `LearningState` the client mirrors but never recomputes.
//!
//! The session layer is IO-free: [`session::QuizSession`] returns
//! [`session::Effect`]s and the [`app::App`] event loop executes them
//! against the [`api::LearningClient`].

pub mod api;
pub mod app;
pub mod data;
pub mod models;
pub mod protocol;
pub mod session;
pub mod student;
pub mod terminal;
pub mod ui;

use std::io;

pub use api::{ApiError, LearningClient};
pub use app::App;
pub use data::NotFound;
pub use models::{Question, Subject};
pub use session::{Effect, Phase, QuizSession};
pub use student::{SavedSession, SessionStore, StudentProgress};

/// Error type for quiz operations.
#[derive(Debug)]
pub enum QuizError {
    /// Requested content does not exist.
    Content(NotFound),
    /// A call to the learning service failed.
    Api(ApiError),
    /// IO error during quiz execution.
    Io(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Content(e) => write!(f, "Quiz not found: {}", e),
            QuizError::Api(e) => write!(f, "Learning service error: {}", e),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Content(e) => Some(e),
            QuizError::Api(e) => Some(e),
            QuizError::Io(e) => Some(e),
        }
    }
}

impl From<NotFound> for QuizError {
    fn from(err: NotFound) -> Self {
        QuizError::Content(err)
    }
}

impl From<ApiError> for QuizError {
    fn from(err: ApiError) -> Self {
        QuizError::Api(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}
