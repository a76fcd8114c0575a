//! Host-side application state.
//!
//! `App` owns the [`QuizSession`] plus the presentation state around it:
//! which screen is showing, which choice is highlighted, which wrong choices
//! are already burned for the current flag, and the feedback line. Wrong
//! choices stay disabled for the rest of the question and re-submitting one
//! is a no-op — the session itself does not re-validate rejected choices.

use log::debug;

use crate::config::QuizConfig;
use crate::data::CandidateSource;
use crate::models::AppState;
use crate::session::{
    AdvanceToken, GuessOutcome, Question, QuizSession, RoundSummary, ScoreState, SessionError,
};

/// Feedback shown under the choice grid after a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The guessed country name, echoed back.
    Correct(String),
    Incorrect,
}

pub struct App {
    pub state: AppState,
    session: QuizSession,
    config: QuizConfig,
    selected: usize,
    disabled: Vec<bool>,
    feedback: Option<Feedback>,
    locked: bool,
    summary: Option<RoundSummary>,
}

impl App {
    /// Build an app around a freshly configured session.
    pub fn new(config: &QuizConfig, source: &dyn CandidateSource) -> Result<Self, SessionError> {
        let mut session = QuizSession::new();
        session.configure(config, source)?;
        Ok(Self::with_session(session, config.clone()))
    }

    /// Wrap an already configured session (deterministic sessions in tests).
    pub fn with_session(session: QuizSession, config: QuizConfig) -> Self {
        Self {
            state: AppState::Welcome,
            session,
            config,
            selected: 0,
            disabled: Vec::new(),
            feedback: None,
            locked: false,
            summary: None,
        }
    }

    /// Start (or restart) a round and switch to the quiz screen.
    pub fn start_quiz(&mut self) -> Result<(), SessionError> {
        self.session.start_round()?;
        self.reset_question_state();
        self.summary = None;
        self.state = AppState::Quiz;
        Ok(())
    }

    fn reset_question_state(&mut self) {
        self.selected = 0;
        self.disabled = vec![false; self.session.choice_count()];
        self.feedback = None;
        self.locked = false;
    }

    pub fn question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn score(&self) -> ScoreState {
        self.session.score()
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_disabled(&self, index: usize) -> bool {
        self.disabled.get(index).copied().unwrap_or(false)
    }

    /// Whether input is locked while the next flag is pending.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn pool_size(&self) -> usize {
        self.session.pool_size()
    }

    pub fn select_next_option(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous_option(&mut self) {
        let count = self.disabled.len();
        if count > 0 {
            self.step_selection(count - 1);
        }
    }

    /// Move the highlight by `step`, skipping disabled choices.
    fn step_selection(&mut self, step: usize) {
        if self.locked {
            return;
        }
        let count = self.disabled.len();
        if count == 0 {
            return;
        }
        let mut next = self.selected;
        for _ in 0..count {
            next = (next + step) % count;
            if !self.disabled[next] {
                self.selected = next;
                return;
            }
        }
    }

    /// Submit the highlighted choice.
    ///
    /// Returns the advance token to schedule when the answer was correct and
    /// more flags remain. Re-submitting an already rejected choice, or
    /// anything while the next flag is pending, is a no-op.
    pub fn submit_selected(&mut self) -> Option<AdvanceToken> {
        if self.locked || self.is_disabled(self.selected) {
            return None;
        }
        let guess = match self.question() {
            Some(question) => question.choices()[self.selected].name.clone(),
            None => return None,
        };

        match self.session.submit_guess(&guess) {
            Ok(GuessOutcome::Correct(token)) => {
                self.locked = true;
                self.feedback = Some(Feedback::Correct(guess));
                Some(token)
            }
            Ok(GuessOutcome::RoundComplete(summary)) => {
                self.summary = Some(summary);
                self.state = AppState::Result;
                None
            }
            Ok(GuessOutcome::Incorrect) => {
                self.disabled[self.selected] = true;
                self.feedback = Some(Feedback::Incorrect);
                self.step_selection(1);
                None
            }
            Err(err) => {
                debug!("guess rejected: {err}");
                None
            }
        }
    }

    /// Deliver a due advance token; stale ones are dropped by the session.
    pub fn advance(&mut self, token: AdvanceToken) {
        if self.session.advance(token).is_some() {
            self.reset_question_state();
        }
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.start_quiz()
    }
}
