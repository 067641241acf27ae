//! Quiz session state machine.
//!
//! `QuizSession` owns everything one quiz-set attempt needs: the shuffled
//! question list, index, score, per-question countdown, the mirrored
//! `LearningState`, and the optional practice drill. All transitions are
//! synchronous and IO-free; network work is requested through [`Effect`]s
//! and fed back via the `apply_*` methods.

use rand::Rng;
use uuid::Uuid;

use crate::data;
use crate::models::{Question, Subject};
use crate::protocol::{
    AdaptiveActionResponse, AiExplanation, LearningState, PracticeProgress, ProcessAnswerRequest,
    ServerAction, StartAdaptiveModeRequest,
};

use super::effect::{CallKind, Effect, PendingCall};
use super::practice::PracticeSubSession;

/// Seconds a question stays open before it counts as a timed-out wrong
/// answer.
pub const QUESTION_TIME_SECS: u32 = 30;
/// Ticks between a timeout and the automatic advance to the next question.
const TIMEOUT_ADVANCE_TICKS: u8 = 2;

const STARS_CORRECT: u32 = 10;
const STARS_LEVEL_UP: u32 = 15;
const STARS_PRACTICE_COMPLETE: u32 = 20;
const STARS_MASTERY: u32 = 50;

const MSG_WRONG: &str = "Let me help you understand! 🦉";
const MSG_FALLBACK: &str = "Almost there! Try again 🦉";
const MSG_RETRY: &str = "Let's try that one more time!";
const MSG_TIMEOUT: &str = "Time's up! Let's look at the next one.";
const MSG_UNKNOWN_ACTION: &str = "Keep going, you're doing great!";
const MSG_MASTERY: &str = "🎉 AMAZING! You've MASTERED this concept! 🏆";
const MSG_PRACTICE_COMPLETE: &str = "Practice Complete! 🎉";
const MSG_LEVEL_UP_MEDIUM: &str = "⬆️ Level Up! Now trying Medium difficulty!";
const MSG_LEVEL_UP_HARD: &str = "⬆️ Great! Now for the Hard challenge!";
const MSG_PRACTICE_UNAVAILABLE: &str = "Practice isn't available right now. Try again!";

/// Where the session currently is. Together with `selected`/`correct` this
/// is everything the view needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Question shown, no answer submitted, countdown running. Covers both
    /// normal and practice questions (`practice` decides which).
    Idle,
    /// Correct answer in normal mode; waiting for the manual Next.
    AnsweredCorrect,
    /// Wrong answer; remediation call in flight (modal shows loading).
    WrongPending,
    /// Remediation arrived; the explanation modal is open.
    Explanation {
        explanation: AiExplanation,
        correct_answer: String,
    },
    /// Wrong answer with no modal (fallback or unknown action); the student
    /// may try another option.
    AnsweredWrong,
    /// Countdown hit zero; auto-advances after a fixed delay.
    TimedOut { ticks_left: u8 },
    /// `start-adaptive-mode` call in flight.
    PracticeStartPending,
    /// Correct practice answer; `process-answer` call in flight.
    PracticeCorrectPending,
    /// Concept mastered; celebration until the student returns.
    PracticeMastery,
    /// Drill finished without a mastery signal.
    PracticeComplete,
    /// All questions answered; terminal for this attempt.
    Complete,
}

pub struct QuizSession {
    id: Uuid,
    student_id: i64,
    class_level: u8,
    subject: Subject,
    chapter_id: String,
    quiz_set_name: String,
    questions: Vec<Question>,
    current: usize,
    score: usize,
    /// True until the current question sees a wrong attempt or timeout;
    /// only first-try-correct answers score.
    first_attempt_clean: bool,
    time_left: u32,
    cursor: usize,
    selected: Option<usize>,
    correct: Option<bool>,
    phase: Phase,
    learning_state: LearningState,
    practice: Option<PracticeSubSession>,
    in_flight: Option<PendingCall>,
    next_seq: u64,
    encouragement: Option<String>,
    topic_completed: bool,
}

impl QuizSession {
    /// Build a session over the given questions, shuffling each question's
    /// options on the way in.
    pub fn new<R: Rng + ?Sized>(
        student_id: i64,
        class_level: u8,
        subject: Subject,
        chapter_id: impl Into<String>,
        quiz_set_name: impl Into<String>,
        questions: Vec<Question>,
        rng: &mut R,
    ) -> Self {
        let questions = questions.into_iter().map(|q| q.shuffled(rng)).collect();
        Self {
            id: Uuid::new_v4(),
            student_id,
            class_level,
            subject,
            chapter_id: chapter_id.into(),
            quiz_set_name: quiz_set_name.into(),
            questions,
            current: 0,
            score: 0,
            first_attempt_clean: true,
            time_left: QUESTION_TIME_SECS,
            cursor: 0,
            selected: None,
            correct: None,
            phase: Phase::Idle,
            learning_state: LearningState::initial(class_level),
            practice: None,
            in_flight: None,
            next_seq: 0,
            encouragement: None,
            topic_completed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The question currently on screen: the practice question while a
    /// drill is active, the normal one otherwise.
    pub fn current_question(&self) -> &Question {
        match &self.practice {
            Some(practice) => practice.current(),
            None => &self.questions[self.current],
        }
    }

    pub fn question_number(&self) -> usize {
        self.current + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.correct
    }

    pub fn is_practice_mode(&self) -> bool {
        self.practice.is_some()
    }

    pub fn practice_progress(&self) -> Option<PracticeProgress> {
        self.practice.as_ref().map(|p| p.progress())
    }

    pub fn learning_state(&self) -> &LearningState {
        &self.learning_state
    }

    pub fn encouragement(&self) -> Option<&str> {
        self.encouragement.as_deref()
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    pub fn quiz_set_name(&self) -> &str {
        &self.quiz_set_name
    }

    pub fn cursor_next(&mut self) {
        let len = self.current_question().options.len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    pub fn cursor_prev(&mut self) {
        let len = self.current_question().options.len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    /// One-second tick. Runs the countdown while a question is open and
    /// drives the post-timeout auto-advance.
    pub fn tick(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Idle if self.selected.is_none() => {
                if self.time_left > 0 {
                    self.time_left -= 1;
                    if self.time_left == 0 {
                        return self.timeout();
                    }
                }
                Vec::new()
            }
            Phase::TimedOut { ticks_left } => {
                if ticks_left > 1 {
                    self.phase = Phase::TimedOut {
                        ticks_left: ticks_left - 1,
                    };
                    Vec::new()
                } else {
                    self.advance()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Submit the option under the cursor.
    pub fn submit_cursor(&mut self) -> Vec<Effect> {
        self.select_answer(self.cursor)
    }

    /// Submit an answer by option index.
    ///
    /// Ignored once the question has been answered correctly, while a call
    /// is in flight, or outside the answerable phases (including the window
    /// after a timeout, so a click can never double-count with one).
    pub fn select_answer(&mut self, index: usize) -> Vec<Effect> {
        if self.in_flight.is_some() || self.correct == Some(true) {
            return Vec::new();
        }
        if !matches!(self.phase, Phase::Idle | Phase::AnsweredWrong) {
            return Vec::new();
        }
        let question = self.current_question().clone();
        if index >= question.options.len() {
            return Vec::new();
        }

        self.selected = Some(index);
        let correct = question.options[index].correct;
        self.correct = Some(correct);

        if correct {
            if self.practice.is_some() {
                return self.practice_correct(&question, index);
            }
            if self.first_attempt_clean {
                self.score += 1;
            }
            self.phase = Phase::AnsweredCorrect;
            self.encouragement = None;
            tracing::debug!(session = %self.id, index, "correct answer");
            return vec![Effect::AddStars(STARS_CORRECT)];
        }

        // Wrong answer. A wrong answer during practice abandons the drill
        // and goes back through normal-mode remediation.
        self.first_attempt_clean = false;
        self.practice = None;
        self.encouragement = Some(MSG_WRONG.to_string());
        self.phase = Phase::WrongPending;
        let request = ProcessAnswerRequest {
            student_id: self.student_id,
            question_id: question.id.clone(),
            selected_answer: index,
            is_correct: false,
            current_state: self.learning_state.clone(),
            question_data: self.with_concept_tags(question),
        };
        let seq = self.begin_call(CallKind::ProcessWrongAnswer);
        tracing::debug!(session = %self.id, index, seq, "wrong answer, requesting remediation");
        vec![Effect::CallProcessAnswer { seq, request }]
    }

    fn practice_correct(&mut self, question: &Question, index: usize) -> Vec<Effect> {
        self.phase = Phase::PracticeCorrectPending;
        let request = ProcessAnswerRequest {
            student_id: self.student_id,
            question_id: question.id.clone(),
            selected_answer: index,
            is_correct: true,
            current_state: self.learning_state.clone(),
            question_data: self.with_concept_tags(question.clone()),
        };
        let seq = self.begin_call(CallKind::ProcessPracticeCorrect);
        vec![Effect::CallProcessAnswer { seq, request }]
    }

    /// Apply a `process-answer` response. Responses whose sequence number
    /// does not match the in-flight call are stale and ignored.
    pub fn apply_answer_response<R: Rng + ?Sized>(
        &mut self,
        seq: u64,
        response: AdaptiveActionResponse,
        rng: &mut R,
    ) -> Vec<Effect> {
        let Some(kind) = self.finish_call(
            seq,
            &[CallKind::ProcessWrongAnswer, CallKind::ProcessPracticeCorrect],
        ) else {
            return Vec::new();
        };

        // The server owns the adaptive state; replace our copy wholesale.
        self.learning_state = response.next_state.clone();

        match kind {
            CallKind::ProcessWrongAnswer => self.apply_remediation(response),
            CallKind::ProcessPracticeCorrect => self.apply_practice_progression(response, rng),
            CallKind::StartPractice => unreachable!("filtered by finish_call"),
        }
    }

    fn apply_remediation(&mut self, response: AdaptiveActionResponse) -> Vec<Effect> {
        if let Some(explanation) = response.data.explanation {
            self.phase = Phase::Explanation {
                explanation,
                correct_answer: response.data.correct_answer.unwrap_or_default(),
            };
            self.encouragement = None;
        } else {
            // Unknown action or an explanation-less payload: no-op with a
            // generic encouragement, student may try another option.
            self.phase = Phase::AnsweredWrong;
            self.encouragement = Some(
                response
                    .data
                    .message
                    .unwrap_or_else(|| MSG_UNKNOWN_ACTION.to_string()),
            );
        }
        Vec::new()
    }

    fn apply_practice_progression<R: Rng + ?Sized>(
        &mut self,
        response: AdaptiveActionResponse,
        rng: &mut R,
    ) -> Vec<Effect> {
        let Some(practice) = self.practice.as_mut() else {
            return Vec::new();
        };

        let mut data = response.data;
        match (response.action, data.question.take()) {
            (ServerAction::ConceptMastered, _) => {
                let first_time = !practice.rewarded;
                practice.rewarded = true;
                self.phase = Phase::PracticeMastery;
                self.encouragement = Some(MSG_MASTERY.to_string());
                if first_time {
                    vec![Effect::AddStars(STARS_MASTERY)]
                } else {
                    Vec::new()
                }
            }
            (ServerAction::GenerateMedium | ServerAction::GenerateHard, Some(question)) => {
                let difficulty = data.difficulty.or(Some(question.difficulty));
                practice.set_generated(question, data.progress, difficulty, rng);
                self.encouragement = Some(
                    match response.action {
                        ServerAction::GenerateHard => MSG_LEVEL_UP_HARD,
                        _ => MSG_LEVEL_UP_MEDIUM,
                    }
                    .to_string(),
                );
                self.reset_answer_state();
                self.phase = Phase::Idle;
                let stars = if response.reward > 0.0 {
                    response.reward.round() as u32
                } else {
                    STARS_LEVEL_UP
                };
                vec![Effect::AddStars(stars)]
            }
            _ => {
                if practice.has_next_local() {
                    practice.advance_local();
                    self.reset_answer_state();
                    self.encouragement = None;
                    self.phase = Phase::Idle;
                    Vec::new()
                } else {
                    // Batch exhausted without a mastery signal.
                    self.phase = Phase::PracticeComplete;
                    self.encouragement = Some(MSG_PRACTICE_COMPLETE.to_string());
                    vec![Effect::AddStars(STARS_PRACTICE_COMPLETE)]
                }
            }
        }
    }

    /// The `process-answer` call failed. `LearningState` is left untouched.
    pub fn answer_call_failed(&mut self, seq: u64) {
        let Some(kind) = self.finish_call(
            seq,
            &[CallKind::ProcessWrongAnswer, CallKind::ProcessPracticeCorrect],
        ) else {
            return;
        };
        match kind {
            CallKind::ProcessWrongAnswer => {
                self.phase = Phase::AnsweredWrong;
                self.encouragement = Some(MSG_FALLBACK.to_string());
            }
            CallKind::ProcessPracticeCorrect => {
                // Let the student answer the practice question again; the
                // next submission re-issues the same request.
                self.reset_answer_state();
                self.encouragement = Some(MSG_RETRY.to_string());
                self.phase = Phase::Idle;
            }
            CallKind::StartPractice => unreachable!("filtered by finish_call"),
        }
    }

    /// The student chose "start practice" from the explanation modal.
    pub fn start_practice(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Explanation { .. }) || self.in_flight.is_some() {
            return Vec::new();
        }
        let question = self.questions[self.current].clone();
        let request = StartAdaptiveModeRequest {
            student_id: self.student_id,
            question_data: self.with_concept_tags(question),
            class_level: self.class_level,
            subject_type: self.subject,
            current_state: Some(self.learning_state.clone()),
        };
        self.phase = Phase::PracticeStartPending;
        let seq = self.begin_call(CallKind::StartPractice);
        tracing::debug!(session = %self.id, seq, "starting practice mode");
        vec![Effect::CallStartPractice { seq, request }]
    }

    /// Apply a `start-adaptive-mode` response.
    pub fn apply_practice_start<R: Rng + ?Sized>(
        &mut self,
        seq: u64,
        response: AdaptiveActionResponse,
        rng: &mut R,
    ) -> Vec<Effect> {
        if self.finish_call(seq, &[CallKind::StartPractice]).is_none() {
            return Vec::new();
        }
        match PracticeSubSession::from_start_response(&response.data, rng) {
            Some(practice) => {
                self.learning_state = response.next_state;
                self.practice = Some(practice);
                self.reset_answer_state();
                self.encouragement = None;
                self.phase = Phase::Idle;
            }
            None => {
                // No usable question in the payload; stay in normal mode
                // with the state we had before the call.
                tracing::warn!(session = %self.id, "practice start response had no questions");
                self.phase = Phase::AnsweredWrong;
                self.encouragement = Some(MSG_PRACTICE_UNAVAILABLE.to_string());
            }
        }
        Vec::new()
    }

    /// The `start-adaptive-mode` call failed; practice mode is not entered.
    pub fn practice_start_failed(&mut self, seq: u64) {
        if self.finish_call(seq, &[CallKind::StartPractice]).is_none() {
            return;
        }
        self.phase = Phase::AnsweredWrong;
        self.encouragement = Some(MSG_PRACTICE_UNAVAILABLE.to_string());
    }

    /// Close the explanation modal and move on to the next question.
    pub fn continue_after_explanation(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Explanation { .. }) {
            return Vec::new();
        }
        self.advance()
    }

    /// Manual Next after a correct answer.
    pub fn handle_next(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::AnsweredCorrect) {
            return Vec::new();
        }
        self.advance()
    }

    /// Leave the mastery / practice-complete celebration and return to the
    /// normal quiz at the next question.
    pub fn back_to_quiz(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::PracticeMastery | Phase::PracticeComplete) {
            return Vec::new();
        }
        self.practice = None;
        self.advance()
    }

    fn advance(&mut self) -> Vec<Effect> {
        self.practice = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.first_attempt_clean = true;
            self.reset_answer_state();
            self.encouragement = None;
            self.phase = Phase::Idle;
            Vec::new()
        } else {
            self.phase = Phase::Complete;
            self.encouragement = None;
            if self.topic_completed {
                Vec::new()
            } else {
                self.topic_completed = true;
                tracing::info!(session = %self.id, score = self.score, "session complete");
                vec![Effect::CompleteTopic(self.chapter_id.clone())]
            }
        }
    }

    fn timeout(&mut self) -> Vec<Effect> {
        // A pure timeout scores as wrong but never calls the service; the
        // session just moves on after a short pause. A timeout during
        // practice abandons the drill.
        self.first_attempt_clean = false;
        self.correct = Some(false);
        self.practice = None;
        self.encouragement = Some(MSG_TIMEOUT.to_string());
        self.phase = Phase::TimedOut {
            ticks_left: TIMEOUT_ADVANCE_TICKS,
        };
        tracing::debug!(session = %self.id, question = self.current, "question timed out");
        Vec::new()
    }

    fn reset_answer_state(&mut self) {
        self.selected = None;
        self.correct = None;
        self.cursor = 0;
        self.time_left = QUESTION_TIME_SECS;
    }

    fn with_concept_tags(&self, mut question: Question) -> Question {
        if question.concept_tags.is_empty() {
            question.concept_tags = data::concept_tags(&self.chapter_id);
        }
        question
    }

    fn begin_call(&mut self, kind: CallKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(PendingCall { seq, kind });
        seq
    }

    /// Resolve the in-flight call if `seq` matches and its kind is one of
    /// `accepted`. Anything else is a stale or foreign response.
    fn finish_call(&mut self, seq: u64, accepted: &[CallKind]) -> Option<CallKind> {
        match self.in_flight {
            Some(pending) if pending.seq == seq && accepted.contains(&pending.kind) => {
                self.in_flight = None;
                Some(pending.kind)
            }
            _ => {
                tracing::debug!(session = %self.id, seq, "dropping stale response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerOption, Difficulty, QuestionId};
    use crate::protocol::ActionData;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: i64, prompt: &str) -> Question {
        Question {
            id: QuestionId::Num(id),
            prompt: prompt.to_string(),
            options: vec![
                AnswerOption {
                    text: "right".to_string(),
                    emoji: None,
                    correct: true,
                },
                AnswerOption {
                    text: "wrong a".to_string(),
                    emoji: None,
                    correct: false,
                },
                AnswerOption {
                    text: "wrong b".to_string(),
                    emoji: None,
                    correct: false,
                },
            ],
            difficulty: Difficulty::Easy,
            explanation: None,
            hint: None,
            concept_tags: Vec::new(),
        }
    }

    fn session(chapter: &str, count: usize) -> QuizSession {
        let questions = (0..count)
            .map(|i| question(i as i64 + 1, &format!("q{}", i + 1)))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        QuizSession::new(7, 1, Subject::Math, chapter, "Test Quiz", questions, &mut rng)
    }

    fn correct_index(session: &QuizSession) -> usize {
        session.current_question().correct_index().unwrap()
    }

    fn wrong_index(session: &QuizSession) -> usize {
        session
            .current_question()
            .options
            .iter()
            .position(|o| !o.correct)
            .unwrap()
    }

    fn explanation_response(state: LearningState) -> AdaptiveActionResponse {
        AdaptiveActionResponse {
            action: ServerAction::ShowExplanation,
            data: ActionData {
                explanation: Some(AiExplanation {
                    encouragement: "Nice try!".to_string(),
                    explanation: "Here is why.".to_string(),
                    example: "For example...".to_string(),
                    tip: "Remember this.".to_string(),
                }),
                correct_answer: Some("right".to_string()),
                ..Default::default()
            },
            reward: 0.0,
            next_state: state,
        }
    }

    fn practice_batch_response(state: LearningState, count: usize) -> AdaptiveActionResponse {
        AdaptiveActionResponse {
            action: ServerAction::GenerateEasy,
            data: ActionData {
                questions: Some(
                    (0..count)
                        .map(|i| question(100 + i as i64, &format!("p{}", i + 1)))
                        .collect(),
                ),
                progress: Some(PracticeProgress { current: 1, total: 3 }),
                ..Default::default()
            },
            reward: 0.0,
            next_state: state,
        }
    }

    fn adaptive_state(consecutive_correct: u32) -> LearningState {
        LearningState {
            consecutive_correct,
            is_in_adaptive_mode: true,
            ..LearningState::initial(1)
        }
    }

    fn seq_of(effects: &[Effect]) -> u64 {
        match effects
            .iter()
            .find(|e| {
                matches!(
                    e,
                    Effect::CallProcessAnswer { .. } | Effect::CallStartPractice { .. }
                )
            })
            .unwrap()
        {
            Effect::CallProcessAnswer { seq, .. } => *seq,
            Effect::CallStartPractice { seq, .. } => *seq,
            _ => unreachable!(),
        }
    }

    fn request_of(effects: &[Effect]) -> &ProcessAnswerRequest {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::CallProcessAnswer { request, .. } => Some(request),
                _ => None,
            })
            .unwrap()
    }

    /// Drive a session into an active practice drill with `count` questions.
    fn enter_practice(session: &mut QuizSession, count: usize) {
        let mut rng = StdRng::seed_from_u64(5);
        let effects = session.select_answer(wrong_index(session));
        let seq = seq_of(&effects);
        session.apply_answer_response(seq, explanation_response(adaptive_state(0)), &mut rng);
        let effects = session.start_practice();
        let seq = seq_of(&effects);
        session.apply_practice_start(seq, practice_batch_response(adaptive_state(0), count), &mut rng);
        assert!(session.is_practice_mode());
        assert_eq!(*session.phase(), Phase::Idle);
    }

    #[test]
    fn correct_answer_in_normal_mode_never_calls_the_service() {
        let mut s = session("shapes", 3);
        let effects = s.select_answer(correct_index(&s));

        assert!(
            !effects
                .iter()
                .any(|e| matches!(e, Effect::CallProcessAnswer { .. })),
            "no process-answer call in normal mode for a correct answer"
        );
        assert_eq!(effects, vec![Effect::AddStars(10)]);
        assert_eq!(*s.phase(), Phase::AnsweredCorrect);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn wrong_answer_triggers_exactly_one_process_answer_call() {
        let mut s = session("shapes", 3);
        let effects = s.select_answer(wrong_index(&s));

        let calls: Vec<_> = effects
            .iter()
            .filter(|e| matches!(e, Effect::CallProcessAnswer { .. }))
            .collect();
        assert_eq!(calls.len(), 1);
        let request = request_of(&effects);
        assert!(!request.is_correct);
        assert_eq!(request.current_state, LearningState::initial(1));
        assert_eq!(*s.phase(), Phase::WrongPending);

        // Re-entrancy: a second click while the call is pending is ignored.
        assert!(s.select_answer(correct_index(&s)).is_empty());
    }

    #[test]
    fn options_lock_after_a_correct_answer() {
        let mut s = session("shapes", 3);
        s.select_answer(correct_index(&s));
        assert!(s.select_answer(wrong_index(&s)).is_empty());
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn retry_is_allowed_after_a_wrong_answer_but_does_not_score() {
        let mut s = session("shapes", 3);
        let effects = s.select_answer(wrong_index(&s));
        s.answer_call_failed(seq_of(&effects));
        assert_eq!(*s.phase(), Phase::AnsweredWrong);

        let effects = s.select_answer(correct_index(&s));
        assert_eq!(effects, vec![Effect::AddStars(10)]);
        assert_eq!(s.score(), 0, "not a first-try correct answer");
        assert_eq!(*s.phase(), Phase::AnsweredCorrect);
    }

    #[test]
    fn timeout_scores_as_wrong_without_any_service_call() {
        let mut s = session("shapes", 2);
        let mut effects = Vec::new();
        for _ in 0..QUESTION_TIME_SECS {
            effects.extend(s.tick());
        }
        assert_eq!(s.is_correct(), Some(false));
        assert!(matches!(s.phase(), Phase::TimedOut { .. }));
        assert!(effects.is_empty());

        // Timeout and click are mutually exclusive once either fires.
        assert!(s.select_answer(correct_index(&s)).is_empty());

        // Auto-advance after the fixed delay.
        s.tick();
        s.tick();
        assert_eq!(*s.phase(), Phase::Idle);
        assert_eq!(s.question_number(), 2);
        assert_eq!(s.score(), 0);
        assert_eq!(s.time_left(), QUESTION_TIME_SECS);
    }

    #[test]
    fn countdown_is_suspended_once_an_answer_is_selected() {
        let mut s = session("shapes", 1);
        s.tick();
        let remaining = s.time_left();
        s.select_answer(correct_index(&s));
        s.tick();
        s.tick();
        assert_eq!(s.time_left(), remaining);
    }

    #[test]
    fn next_request_carries_the_server_state_unchanged() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(9);

        let effects = s.select_answer(wrong_index(&s));
        let seq = seq_of(&effects);
        let server_state = LearningState {
            consecutive_wrong: 2,
            current_difficulty: Difficulty::Medium,
            recent_performance: vec![false, false],
            time_spent: Some(17),
            ..LearningState::initial(1)
        };
        let response = AdaptiveActionResponse {
            action: ServerAction::Unknown,
            data: ActionData::default(),
            reward: 0.0,
            next_state: server_state.clone(),
        };
        s.apply_answer_response(seq, response, &mut rng);
        assert_eq!(*s.phase(), Phase::AnsweredWrong);

        // Another wrong attempt must echo the server's state verbatim.
        let effects = s.select_answer(wrong_index(&s));
        assert_eq!(request_of(&effects).current_state, server_state);
    }

    #[test]
    fn failed_call_leaves_learning_state_untouched() {
        let mut s = session("shapes", 3);
        let before = s.learning_state().clone();

        let effects = s.select_answer(wrong_index(&s));
        s.answer_call_failed(seq_of(&effects));

        assert_eq!(*s.learning_state(), before);
        let effects = s.select_answer(wrong_index(&s));
        assert_eq!(request_of(&effects).current_state, before);
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(3);

        let effects = s.select_answer(wrong_index(&s));
        let seq = seq_of(&effects);
        let before = s.learning_state().clone();

        // Wrong sequence number: ignored entirely.
        let effects = s.apply_answer_response(seq + 10, explanation_response(adaptive_state(1)), &mut rng);
        assert!(effects.is_empty());
        assert_eq!(*s.phase(), Phase::WrongPending);
        assert_eq!(*s.learning_state(), before);

        // The real one still lands.
        s.apply_answer_response(seq, explanation_response(adaptive_state(1)), &mut rng);
        assert!(matches!(s.phase(), Phase::Explanation { .. }));
    }

    #[test]
    fn explanation_modal_shows_payload_and_continue_advances() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(4);

        let effects = s.select_answer(wrong_index(&s));
        s.apply_answer_response(seq_of(&effects), explanation_response(adaptive_state(0)), &mut rng);

        match s.phase() {
            Phase::Explanation {
                explanation,
                correct_answer,
            } => {
                assert_eq!(explanation.encouragement, "Nice try!");
                assert_eq!(correct_answer, "right");
            }
            other => panic!("expected explanation modal, got {:?}", other),
        }

        s.continue_after_explanation();
        assert_eq!(*s.phase(), Phase::Idle);
        assert_eq!(s.question_number(), 2);
    }

    #[test]
    fn practice_wrong_answer_exits_practice_mode() {
        let mut s = session("shapes", 3);
        enter_practice(&mut s, 3);

        let effects = s.select_answer(wrong_index(&s));
        assert!(!s.is_practice_mode(), "wrong answer abandons the drill");
        assert!(!request_of(&effects).is_correct);
        assert_eq!(*s.phase(), Phase::WrongPending);
    }

    #[test]
    fn practice_correct_answer_reports_to_the_service() {
        let mut s = session("shapes", 3);
        enter_practice(&mut s, 3);

        let effects = s.select_answer(correct_index(&s));
        let request = request_of(&effects);
        assert!(request.is_correct);
        assert!(request.current_state.is_in_adaptive_mode);
        assert_eq!(*s.phase(), Phase::PracticeCorrectPending);
    }

    #[test]
    fn practice_batch_advances_locally_without_new_questions() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(6);
        enter_practice(&mut s, 3);
        let first = s.current_question().id.clone();

        let effects = s.select_answer(correct_index(&s));
        let response = AdaptiveActionResponse {
            action: ServerAction::Unknown,
            data: ActionData::default(),
            reward: 0.0,
            next_state: adaptive_state(1),
        };
        s.apply_answer_response(seq_of(&effects), response, &mut rng);

        assert!(s.is_practice_mode());
        assert_eq!(*s.phase(), Phase::Idle);
        assert_ne!(s.current_question().id, first);
        assert_eq!(s.practice_progress().unwrap().current, 2);
    }

    #[test]
    fn generated_question_replaces_current_and_grants_reward() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(8);
        enter_practice(&mut s, 1);

        let effects = s.select_answer(correct_index(&s));
        let mut harder = question(500, "harder");
        harder.difficulty = Difficulty::Medium;
        let response = AdaptiveActionResponse {
            action: ServerAction::GenerateMedium,
            data: ActionData {
                question: Some(harder),
                difficulty: Some(Difficulty::Medium),
                progress: Some(PracticeProgress { current: 2, total: 3 }),
                ..Default::default()
            },
            reward: 0.0,
            next_state: adaptive_state(1),
        };
        let effects = s.apply_answer_response(seq_of(&effects), response, &mut rng);

        assert_eq!(effects, vec![Effect::AddStars(15)]);
        assert!(s.is_practice_mode());
        assert_eq!(*s.phase(), Phase::Idle);
        assert_eq!(s.current_question().id, QuestionId::Num(500));
        assert_eq!(s.practice_progress().unwrap().current, 2);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn concept_mastered_grants_the_fixed_reward_exactly_once() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(10);
        enter_practice(&mut s, 3);

        let effects = s.select_answer(correct_index(&s));
        let seq = seq_of(&effects);
        let mastered = AdaptiveActionResponse {
            action: ServerAction::ConceptMastered,
            data: ActionData::default(),
            reward: 50.0,
            next_state: adaptive_state(3),
        };
        let effects = s.apply_answer_response(seq, mastered.clone(), &mut rng);
        assert_eq!(effects, vec![Effect::AddStars(50)]);
        assert_eq!(*s.phase(), Phase::PracticeMastery);

        // A replayed response must not pay out again.
        let effects = s.apply_answer_response(seq, mastered, &mut rng);
        assert!(effects.is_empty());

        s.back_to_quiz();
        assert!(!s.is_practice_mode());
        assert_eq!(s.question_number(), 2);
    }

    #[test]
    fn scenario_three_question_quiz_scores_two_of_three() {
        let mut s = session("counting", 3);
        let mut rng = StdRng::seed_from_u64(11);
        let mut all_effects = Vec::new();

        // Q1 correct.
        all_effects.extend(s.select_answer(correct_index(&s)));
        all_effects.extend(s.handle_next());

        // Q2 wrong: view explanation, click continue.
        let effects = s.select_answer(wrong_index(&s));
        let seq = seq_of(&effects);
        all_effects.extend(effects);
        all_effects.extend(s.apply_answer_response(
            seq,
            explanation_response(adaptive_state(0)),
            &mut rng,
        ));
        all_effects.extend(s.continue_after_explanation());

        // Q3 correct.
        all_effects.extend(s.select_answer(correct_index(&s)));
        all_effects.extend(s.handle_next());

        assert_eq!(*s.phase(), Phase::Complete);
        assert_eq!(s.score(), 2);
        let completions: Vec<_> = all_effects
            .iter()
            .filter(|e| matches!(e, Effect::CompleteTopic(t) if t == "counting"))
            .collect();
        assert_eq!(completions.len(), 1);
        // Terminal: no further transitions emit anything.
        assert!(s.handle_next().is_empty());
        assert!(s.select_answer(0).is_empty());
    }

    #[test]
    fn scenario_practice_batch_completes_and_returns_to_normal_mode() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(12);
        enter_practice(&mut s, 3);

        let no_signal = |state| AdaptiveActionResponse {
            action: ServerAction::Unknown,
            data: ActionData::default(),
            reward: 0.0,
            next_state: state,
        };

        // Three correct answers, no mastery signal on the last.
        for round in 1..=3 {
            let effects = s.select_answer(correct_index(&s));
            let effects =
                s.apply_answer_response(seq_of(&effects), no_signal(adaptive_state(round)), &mut rng);
            if round < 3 {
                assert_eq!(*s.phase(), Phase::Idle);
                assert!(s.is_practice_mode());
                assert!(effects.is_empty());
            } else {
                assert_eq!(*s.phase(), Phase::PracticeComplete);
                assert_eq!(effects, vec![Effect::AddStars(20)]);
            }
        }

        s.back_to_quiz();
        assert!(!s.is_practice_mode());
        assert_eq!(*s.phase(), Phase::Idle);
        assert_eq!(s.question_number(), 2);
    }

    #[test]
    fn scenario_network_failure_keeps_state_bit_identical() {
        let mut s = session("shapes", 3);
        let before = s.learning_state().clone();

        let effects = s.select_answer(wrong_index(&s));
        s.answer_call_failed(seq_of(&effects));

        // Fallback message shown, retry possible, state untouched.
        assert_eq!(*s.phase(), Phase::AnsweredWrong);
        assert!(s.encouragement().is_some());
        let effects = s.select_answer(wrong_index(&s));
        assert_eq!(request_of(&effects).current_state, before);
    }

    #[test]
    fn failed_practice_start_keeps_the_student_in_normal_mode() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(13);

        let effects = s.select_answer(wrong_index(&s));
        s.apply_answer_response(seq_of(&effects), explanation_response(adaptive_state(0)), &mut rng);
        let effects = s.start_practice();
        s.practice_start_failed(seq_of(&effects));

        assert!(!s.is_practice_mode());
        assert_eq!(*s.phase(), Phase::AnsweredWrong);
        assert_eq!(*s.learning_state(), adaptive_state(0));
    }

    #[test]
    fn practice_start_without_questions_is_treated_as_unavailable() {
        let mut s = session("shapes", 3);
        let mut rng = StdRng::seed_from_u64(14);

        let effects = s.select_answer(wrong_index(&s));
        let state_before = adaptive_state(0);
        s.apply_answer_response(seq_of(&effects), explanation_response(state_before.clone()), &mut rng);
        let effects = s.start_practice();
        let empty = AdaptiveActionResponse {
            action: ServerAction::GenerateEasy,
            data: ActionData::default(),
            reward: 0.0,
            next_state: adaptive_state(9),
        };
        s.apply_practice_start(seq_of(&effects), empty, &mut rng);

        assert!(!s.is_practice_mode());
        // Malformed success must not half-apply: state stays as before.
        assert_eq!(*s.learning_state(), state_before);
    }

    #[test]
    fn concept_tags_are_attached_from_the_chapter_when_missing() {
        let mut s = session("class1-math-shapes-and-space", 3);
        let effects = s.select_answer(wrong_index(&s));
        let request = request_of(&effects);
        assert!(request.question_data.concept_tags.contains(&"shapes".to_string()));
    }
}
