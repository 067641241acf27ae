//! Request/response contract of the remote learning service.

mod messages;

pub use messages::{
    ActionData, AdaptiveActionResponse, AiExplanation, GenerateQuestionRequest, LearningState,
    LoginRequest, MasteryRecord, MasteryStatus, PracticeProgress, ProcessAnswerRequest,
    QuizBatchRequest, QuizBatchResponse, ReviewConcepts, ServerAction, SignupRequest,
    StartAdaptiveModeRequest, TokenResponse, UserProfile,
};
