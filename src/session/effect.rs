//! Side effects requested by the session controller.
//!
//! The controller never performs IO itself; transitions return `Effect`
//! values and the event loop executes them. Network effects carry a call
//! sequence number so a late or superseded response can be recognized and
//! dropped.

use crate::protocol::{ProcessAnswerRequest, StartAdaptiveModeRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// POST the answer to `process-answer`.
    CallProcessAnswer {
        seq: u64,
        request: ProcessAnswerRequest,
    },
    /// POST to `start-adaptive-mode` to enter practice.
    CallStartPractice {
        seq: u64,
        request: StartAdaptiveModeRequest,
    },
    /// Grant stars to the student's progress counters.
    AddStars(u32),
    /// Mark the chapter's topic as completed. Emitted once per session.
    CompleteTopic(String),
}

/// Which remote call is currently in flight. At most one exists at a time;
/// answer submissions are ignored while one is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    ProcessWrongAnswer,
    ProcessPracticeCorrect,
    StartPractice,
}

#[derive(Debug, Clone, Copy)]
pub struct PendingCall {
    pub seq: u64,
    pub kind: CallKind,
}
