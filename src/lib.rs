//! # flag-quiz
//!
//! A terminal flag-guessing game: ten flags per round, pick the country out
//! of 3, 6 or 9 choices, accuracy reported at the end.
//!
//! The quiz logic lives in [`QuizSession`], a plain state machine with no UI
//! dependency; the TUI here is one possible host for it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use flag_quiz::{CandidateCatalog, FlagQuiz, QuizConfig, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let catalog = CandidateCatalog::from_json("countries.json")?;
//!     let config = QuizConfig::parse("6", &["Europe".to_string()])?;
//!
//!     FlagQuiz::new(catalog, config)?.run().await
//! }
//! ```

mod app;
mod config;
mod data;
mod models;
mod session;
pub mod terminal;
mod timer;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;

pub use app::{App, Feedback};
pub use config::{ConfigError, QuizConfig, CHOICE_COUNTS};
pub use data::{CandidateCatalog, CandidateSource, LoadError};
pub use models::{AppState, Candidate};
pub use session::{
    AdvanceToken, GuessOutcome, Question, QuizSession, RoundSummary, ScoreState, SessionError,
    SessionPhase, FLAGS_PER_ROUND,
};
pub use timer::{AdvanceTimer, QUESTION_DELAY};

/// Error type for quiz operations.
#[derive(Debug)]
pub enum QuizError {
    /// Invalid settings before the session ever saw them.
    Config(ConfigError),
    /// Error loading the candidate catalog.
    Load(LoadError),
    /// The session rejected an operation.
    Session(SessionError),
    /// IO error during quiz execution.
    Io(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Config(e) => write!(f, "Invalid configuration: {}", e),
            QuizError::Load(e) => write!(f, "Failed to load candidates: {}", e),
            QuizError::Session(e) => write!(f, "Quiz session error: {}", e),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Config(e) => Some(e),
            QuizError::Load(e) => Some(e),
            QuizError::Session(e) => Some(e),
            QuizError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for QuizError {
    fn from(err: ConfigError) -> Self {
        QuizError::Config(err)
    }
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Load(err)
    }
}

impl From<SessionError> for QuizError {
    fn from(err: SessionError) -> Self {
        QuizError::Session(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}

/// A quiz instance that can be run in the terminal.
pub struct FlagQuiz {
    app: App,
}

impl FlagQuiz {
    /// Create a quiz over `catalog` with the given settings.
    pub fn new(catalog: CandidateCatalog, config: QuizConfig) -> Result<Self, QuizError> {
        let app = App::new(&config, &catalog)?;
        Ok(Self { app })
    }

    /// Run the quiz in the terminal.
    ///
    /// Takes over the terminal, displays the quiz UI, and returns when the
    /// player quits.
    pub async fn run(mut self) -> Result<(), QuizError> {
        let mut term = terminal::init()?;
        let result = run_event_loop(&mut term, &mut self.app).await;
        terminal::restore()?;
        result
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

/// What an input event asks the event loop to do.
enum InputAction {
    None,
    Quit,
    Schedule(AdvanceToken),
    CancelPending,
}

async fn run_event_loop(
    terminal: &mut terminal::AppTerminal,
    app: &mut App,
) -> Result<(), QuizError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timer = AdvanceTimer::new();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Deliver any advance that came due; the session drops stale ones.
        while let Ok(token) = rx.try_recv() {
            app.advance(token);
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match handle_input(app, key.code)? {
                    InputAction::None => {}
                    InputAction::Quit => break,
                    InputAction::Schedule(token) => timer.schedule(tx.clone(), token),
                    InputAction::CancelPending => timer.cancel(),
                }
            }
        }
    }

    timer.cancel();
    Ok(())
}

fn handle_input(app: &mut App, key: KeyCode) -> Result<InputAction, QuizError> {
    match app.state {
        AppState::Welcome => handle_welcome_input(app, key),
        AppState::Quiz => Ok(handle_quiz_input(app, key)),
        AppState::Result => handle_result_input(app, key),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> Result<InputAction, QuizError> {
    match key {
        KeyCode::Enter => {
            app.start_quiz()?;
            Ok(InputAction::None)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Ok(InputAction::Quit),
        _ => Ok(InputAction::None),
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> InputAction {
    match key {
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h') => {
            app.select_previous_option();
            InputAction::None
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l') => {
            app.select_next_option();
            InputAction::None
        }
        KeyCode::Enter | KeyCode::Char(' ') => match app.submit_selected() {
            Some(token) => InputAction::Schedule(token),
            None => InputAction::None,
        },
        KeyCode::Char('q') | KeyCode::Char('Q') => InputAction::Quit,
        _ => InputAction::None,
    }
}

fn handle_result_input(app: &mut App, key: KeyCode) -> Result<InputAction, QuizError> {
    match key {
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => {
            app.restart()?;
            // Anything still pending belongs to the finished round.
            Ok(InputAction::CancelPending)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Ok(InputAction::Quit),
        _ => Ok(InputAction::None),
    }
}
