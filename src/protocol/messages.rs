//! Wire types for the learning service API.
//!
//! All bodies are JSON with camelCase field names, matching the backend's
//! schemas. Mastery records keep their snake_case inner fields.

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, Question, QuestionId, Subject};

/// Server-owned adaptive state, mirrored by the client.
///
/// The client creates the initial value once per session and from then on
/// only ever replaces it wholesale with the `nextState` of a response. No
/// field is recomputed locally, and a failed call leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningState {
    pub class_level: u8,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    pub current_difficulty: Difficulty,
    pub is_in_adaptive_mode: bool,
    #[serde(default)]
    pub recent_performance: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints_used: Option<u32>,
}

impl LearningState {
    /// State for a fresh session before the server has said anything.
    pub fn initial(class_level: u8) -> Self {
        Self {
            class_level,
            consecutive_correct: 0,
            consecutive_wrong: 0,
            current_difficulty: Difficulty::Easy,
            is_in_adaptive_mode: false,
            recent_performance: Vec::new(),
            concept_tags: None,
            question_type: None,
            time_spent: None,
            hints_used: None,
        }
    }
}

/// Action tag returned by the server.
///
/// The vocabulary grows server-side; anything we do not recognize falls
/// into `Unknown` and is treated as a no-op with a generic encouragement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAction {
    ShowExplanation,
    GenerateEasy,
    GenerateMedium,
    GenerateHard,
    ConceptMastered,
    #[serde(other)]
    Unknown,
}

/// AI-written remediation shown after a wrong answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiExplanation {
    pub encouragement: String,
    pub explanation: String,
    pub example: String,
    pub tip: String,
}

/// Position inside a practice drill (e.g. level 2 of 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeProgress {
    pub current: u32,
    pub total: u32,
}

/// Payload attached to an action response. Every field is optional; which
/// ones are present depends on the action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<AiExplanation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_practice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Single next question, for one-at-a-time practice progression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    /// Pre-generated batch, the newer shape of `start-adaptive-mode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<PracticeProgress>,
}

/// Response envelope shared by `process-answer` and `start-adaptive-mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveActionResponse {
    pub action: ServerAction,
    #[serde(default)]
    pub data: ActionData,
    #[serde(default)]
    pub reward: f64,
    pub next_state: LearningState,
}

/// Body of `POST /api/learning/process-answer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAnswerRequest {
    pub student_id: i64,
    pub question_id: QuestionId,
    pub selected_answer: usize,
    pub is_correct: bool,
    pub current_state: LearningState,
    pub question_data: Question,
}

/// Body of `POST /api/learning/generate-question`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    pub original_question: String,
    pub correct_answer: String,
    pub concept_tags: Vec<String>,
    pub difficulty: Difficulty,
    pub class_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
}

/// Body of `POST /api/learning/start-adaptive-mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAdaptiveModeRequest {
    pub student_id: i64,
    pub question_data: Question,
    pub class_level: u8,
    pub subject_type: Subject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<LearningState>,
}

/// Body of `POST /api/learning/generate-quiz-batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBatchRequest {
    pub concept_tags: Vec<String>,
    pub class_level: u8,
    pub subject_type: Subject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizBatchResponse {
    pub questions: Vec<Question>,
}

/// One mastery record, as stored by the backend (snake_case fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub concept_tag: String,
    pub mastery_level: f64,
    pub total_attempts: u32,
    pub successful_attempts: u32,
}

/// Response of `GET /api/learning/mastery/{studentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryStatus {
    pub student_id: i64,
    pub mastery_records: Vec<MasteryRecord>,
    pub total_concepts: u32,
    pub mastered_concepts: u32,
}

/// Response of `GET /api/learning/review-concepts/{studentId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewConcepts {
    pub student_id: i64,
    #[serde(default)]
    pub review_concepts: Vec<serde_json::Value>,
    pub total_to_review: u32,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub class_name: String,
    pub email: String,
    pub password: String,
}

/// Bearer token issued by `login` and `signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Profile returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub class_name: String,
}

impl UserProfile {
    /// Class level as a number; the backend stores it as a string.
    pub fn class_level(&self) -> u8 {
        self.class_name.trim().parse().unwrap_or(1)
    }
}
