//! HTTP client for the remote learning service.
//!
//! Thin request/response wrapper: no automatic retry, no local state. The
//! session controller decides what to do with failures.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::Question;
use crate::protocol::{
    AdaptiveActionResponse, GenerateQuestionRequest, LoginRequest, MasteryStatus,
    ProcessAnswerRequest, QuizBatchRequest, QuizBatchResponse, ReviewConcepts, SignupRequest,
    StartAdaptiveModeRequest, TokenResponse, UserProfile,
};

/// Error from a remote call.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad body).
    Network(reqwest::Error),
    /// The server answered with a non-2xx status.
    Rejected { status: u16, message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "network error: {}", e),
            ApiError::Rejected { status, message } => {
                write!(f, "server rejected request ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            ApiError::Rejected { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}

/// Client for the `/api/learning/*` and `/api/auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct LearningClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl LearningClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            token: None,
        }
    }

    /// Attach a bearer token to all subsequent requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit an answer and receive the server's next action.
    pub async fn process_answer(
        &self,
        request: &ProcessAnswerRequest,
    ) -> Result<AdaptiveActionResponse, ApiError> {
        tracing::debug!(
            question_id = %request.question_id,
            is_correct = request.is_correct,
            "process-answer"
        );
        self.post_json("/api/learning/process-answer", request).await
    }

    /// One-off generation of a similar question at a given difficulty.
    pub async fn generate_question(
        &self,
        request: &GenerateQuestionRequest,
    ) -> Result<Question, ApiError> {
        self.post_json("/api/learning/generate-question", request)
            .await
    }

    /// Enter practice mode. The response carries either a single first
    /// question or a pre-generated batch; callers must handle both.
    pub async fn start_adaptive_mode(
        &self,
        request: &StartAdaptiveModeRequest,
    ) -> Result<AdaptiveActionResponse, ApiError> {
        tracing::debug!(question_id = %request.question_data.id, "start-adaptive-mode");
        self.post_json("/api/learning/start-adaptive-mode", request)
            .await
    }

    /// Generate a whole quiz set in one round trip.
    pub async fn generate_quiz_batch(
        &self,
        request: &QuizBatchRequest,
    ) -> Result<Vec<Question>, ApiError> {
        let response: QuizBatchResponse = self
            .post_json("/api/learning/generate-quiz-batch", request)
            .await?;
        Ok(response.questions)
    }

    pub async fn mastery_status(&self, student_id: i64) -> Result<MasteryStatus, ApiError> {
        self.get_json(&format!("/api/learning/mastery/{}", student_id))
            .await
    }

    pub async fn review_concepts(&self, student_id: i64) -> Result<ReviewConcepts, ApiError> {
        self.get_json(&format!("/api/learning/review-concepts/{}", student_id))
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.post_json("/api/auth/login", request).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<TokenResponse, ApiError> {
        self.post_json("/api/auth/signup", request).await
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/api/auth/me").await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut builder = self.http.post(format!("{}{}", self.base_url, path)).json(body);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;
        decode_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut builder = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    // FastAPI-style error bodies carry the message under "detail".
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(str::to_string)))
        .unwrap_or(body);
    tracing::warn!(status = status.as_u16(), %message, "request rejected");
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
