//! App runner: wires the session controller to the terminal, the clock,
//! and the learning service.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::api::{ApiError, LearningClient};
use crate::protocol::AdaptiveActionResponse;
use crate::session::{Effect, Phase, QuizSession};
use crate::student::StudentProgress;
use crate::{terminal, ui};

/// Result of a remote call, routed back to the event loop by seq.
enum ApiEvent {
    Answer {
        seq: u64,
        result: Result<AdaptiveActionResponse, ApiError>,
    },
    PracticeStart {
        seq: u64,
        result: Result<AdaptiveActionResponse, ApiError>,
    },
}

pub struct App {
    session: QuizSession,
    student: StudentProgress,
    client: LearningClient,
    rng: StdRng,
    should_quit: bool,
}

impl App {
    pub fn new(session: QuizSession, student: StudentProgress, client: LearningClient) -> Self {
        Self {
            session,
            student,
            client,
            rng: StdRng::from_os_rng(),
            should_quit: false,
        }
    }

    pub fn student(&self) -> &StudentProgress {
        &self.student
    }

    /// Run the TUI until the student quits.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut terminal = terminal::init()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<ApiEvent>();

        let tick_rate = Duration::from_secs(1);
        let mut last_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.session, &self.student))?;

            // Handle input with timeout
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let effects = self.handle_key(key.code);
                        self.run_effects(effects, &tx);
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                let effects = self.session.tick();
                self.run_effects(effects, &tx);
            }

            // Drain finished API calls without blocking the render loop.
            while let Ok(api_event) = rx.try_recv() {
                let effects = self.apply_api_event(api_event);
                self.run_effects(effects, &tx);
            }
        }

        terminal::restore()?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> Vec<Effect> {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.session.cursor_prev();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.session.cursor_next();
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.session.submit_cursor(),
            KeyCode::Char('n') => self.session.handle_next(),
            KeyCode::Char('c') => self.session.continue_after_explanation(),
            KeyCode::Char('p') => self.session.start_practice(),
            KeyCode::Char('b') => self.session.back_to_quiz(),
            _ => Vec::new(),
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>, tx: &mpsc::UnboundedSender<ApiEvent>) {
        for effect in effects {
            match effect {
                Effect::AddStars(count) => self.student.add_stars(count),
                Effect::CompleteTopic(topic) => {
                    self.student.complete_topic(&topic);
                    if self.session.score() == self.session.total_questions() {
                        self.student
                            .add_badge(&format!("Perfect: {}", self.session.quiz_set_name()));
                    }
                }
                Effect::CallProcessAnswer { seq, request } => {
                    let client = self.client.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = client.process_answer(&request).await;
                        let _ = tx.send(ApiEvent::Answer { seq, result });
                    });
                }
                Effect::CallStartPractice { seq, request } => {
                    let client = self.client.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = client.start_adaptive_mode(&request).await;
                        let _ = tx.send(ApiEvent::PracticeStart { seq, result });
                    });
                }
            }
        }
    }

    fn apply_api_event(&mut self, api_event: ApiEvent) -> Vec<Effect> {
        match api_event {
            ApiEvent::Answer { seq, result } => match result {
                Ok(response) => self
                    .session
                    .apply_answer_response(seq, response, &mut self.rng),
                Err(e) => {
                    tracing::warn!(error = %e, "process-answer call failed");
                    self.session.answer_call_failed(seq);
                    Vec::new()
                }
            },
            ApiEvent::PracticeStart { seq, result } => match result {
                Ok(response) => self
                    .session
                    .apply_practice_start(seq, response, &mut self.rng),
                Err(e) => {
                    tracing::warn!(error = %e, "start-adaptive-mode call failed");
                    self.session.practice_start_failed(seq);
                    Vec::new()
                }
            },
        }
    }

    /// True once the session reached its terminal screen.
    pub fn is_finished(&self) -> bool {
        matches!(self.session.phase(), Phase::Complete)
    }
}
