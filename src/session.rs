//! The quiz round state machine.
//!
//! [`QuizSession`] owns the candidate pool, the current round's queue of
//! flags, and the score counters, and knows nothing about rendering or input.
//! The host drives it through `configure`/`start_round`/`submit_guess` and
//! later hands back the [`AdvanceToken`] from a correct guess to move to the
//! next flag. Tokens are stamped with the session epoch, so one that was
//! scheduled before a restart or reconfiguration is silently discarded
//! instead of resurrecting a stale question.
//!
//! The session is not reentrancy-safe: it expects one caller, one guess at a
//! time. Here it is owned by the host `App` and every mutation goes through
//! the single event loop.

use std::fmt;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, QuizConfig};
use crate::data::{CandidateSource, LoadError};
use crate::models::Candidate;

/// Flags in a single round.
pub const FLAGS_PER_ROUND: usize = 10;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No round running (fresh, reconfigured, or never started).
    Idle,
    /// A round is in progress and a question is live or pending.
    RoundActive,
    /// The tenth flag was answered; waiting for `start_round`.
    RoundComplete,
}

/// Running counters for the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreState {
    pub correct_answers: u32,
    pub total_guesses: u32,
}

/// Final numbers for a finished round.
///
/// `accuracy` is `1000.0 / total_guesses`: a flawless round of ten guesses
/// scores 100.0, and every wrong guess drags it down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummary {
    pub total_guesses: u32,
    pub accuracy: f64,
}

/// Claim ticket for the delayed move to the next flag.
///
/// Returned by a correct (non-final) guess; redeem it with
/// [`QuizSession::advance`] once the display delay has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    epoch: u64,
}

impl AdvanceToken {
    #[cfg(test)]
    pub(crate) fn for_epoch(epoch: u64) -> Self {
        Self { epoch }
    }
}

/// What a submitted guess amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuessOutcome {
    /// Right answer, more flags remain; schedule the token.
    Correct(AdvanceToken),
    /// Right answer on the final flag.
    RoundComplete(RoundSummary),
    /// Wrong answer; the question stays live.
    Incorrect,
}

/// One flag plus its answer grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    choices: Vec<Candidate>,
    correct_index: usize,
    number: usize,
}

impl Question {
    pub fn choices(&self) -> &[Candidate] {
        &self.choices
    }

    pub fn correct(&self) -> &Candidate {
        &self.choices[self.correct_index]
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// 1-based position within the round.
    pub fn number(&self) -> usize {
        self.number
    }
}

/// A quiz round in progress.
pub struct QuizSession {
    pool: Vec<Candidate>,
    queue: Vec<Candidate>,
    current: Option<Question>,
    choice_count: usize,
    score: ScoreState,
    phase: SessionPhase,
    epoch: u64,
    awaiting_advance: bool,
    shown: usize,
    rng: StdRng,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A session with a deterministic RNG, for reproducible rounds.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pool: Vec::new(),
            queue: Vec::new(),
            current: None,
            choice_count: 3,
            score: ScoreState::default(),
            phase: SessionPhase::Idle,
            epoch: 0,
            awaiting_advance: false,
            shown: 0,
            rng,
        }
    }

    /// Rebuild the answer pool from the configured regions.
    ///
    /// Validates the configuration, asks `source` for each region's
    /// candidates, and deduplicates them by code. Any round in progress is
    /// abandoned and a pending advance is invalidated.
    pub fn configure(
        &mut self,
        config: &QuizConfig,
        source: &dyn CandidateSource,
    ) -> Result<(), SessionError> {
        config.validate()?;

        let mut pool: Vec<Candidate> = Vec::new();
        for region in &config.regions {
            for candidate in source.list_candidates(region)? {
                if !pool.iter().any(|c| c.code == candidate.code) {
                    pool.push(candidate);
                }
            }
        }

        self.pool = pool;
        self.choice_count = config.choice_count;
        self.epoch += 1;
        self.awaiting_advance = false;
        self.current = None;
        self.queue.clear();
        self.score = ScoreState::default();
        self.shown = 0;
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    /// Begin a fresh round: zero the counters, draw ten flags without
    /// replacement, and emit the first question.
    pub fn start_round(&mut self) -> Result<&Question, SessionError> {
        if self.pool.is_empty() {
            return Err(SessionError::EmptyAnswerPool);
        }
        let required = FLAGS_PER_ROUND.max(self.choice_count);
        if self.pool.len() < required {
            return Err(SessionError::InsufficientCandidates {
                available: self.pool.len(),
                required,
            });
        }

        self.epoch += 1;
        self.awaiting_advance = false;
        self.score = ScoreState::default();
        self.shown = 0;
        self.queue = index::sample(&mut self.rng, self.pool.len(), FLAGS_PER_ROUND)
            .into_iter()
            .map(|i| self.pool[i].clone())
            .collect();
        self.phase = SessionPhase::RoundActive;

        info!(
            "round started: {} candidates in pool, {} choices per flag",
            self.pool.len(),
            self.choice_count
        );

        self.show_next();
        Ok(self.current.as_ref().expect("fresh round has a question"))
    }

    /// The live question, stable between guesses.
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn choice_count(&self) -> usize {
        self.choice_count
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Judge a guess against the live question's answer.
    ///
    /// Every accepted guess counts toward `total_guesses`. The session does
    /// not remember which wrong names were already tried — keeping a rejected
    /// choice from being re-submitted is the caller's job.
    pub fn submit_guess(&mut self, guess: &str) -> Result<GuessOutcome, SessionError> {
        if self.awaiting_advance {
            return Err(SessionError::NoActiveQuestion);
        }
        let correct = match &self.current {
            Some(question) => question.correct().name.clone(),
            None => return Err(SessionError::NoActiveQuestion),
        };

        self.score.total_guesses += 1;

        if guess != correct {
            return Ok(GuessOutcome::Incorrect);
        }

        self.score.correct_answers += 1;
        if self.score.correct_answers as usize == FLAGS_PER_ROUND {
            self.phase = SessionPhase::RoundComplete;
            self.current = None;
            let summary = RoundSummary {
                total_guesses: self.score.total_guesses,
                accuracy: 1000.0 / self.score.total_guesses as f64,
            };
            info!(
                "round complete: {} guesses, accuracy {:.1}",
                summary.total_guesses, summary.accuracy
            );
            Ok(GuessOutcome::RoundComplete(summary))
        } else {
            self.awaiting_advance = true;
            Ok(GuessOutcome::Correct(AdvanceToken { epoch: self.epoch }))
        }
    }

    /// Redeem an advance token, emitting the next question.
    ///
    /// Returns `None` when the token's epoch is no longer current — the
    /// session was restarted or reconfigured after the token was issued —
    /// or when no advance is due.
    pub fn advance(&mut self, token: AdvanceToken) -> Option<&Question> {
        if token.epoch != self.epoch || !self.awaiting_advance {
            debug!(
                "discarding stale advance (token epoch {}, session epoch {})",
                token.epoch, self.epoch
            );
            return None;
        }
        self.show_next();
        self.current.as_ref()
    }

    fn show_next(&mut self) {
        // The queue holds ten flags and one is taken per question; the round
        // completes on the tenth correct answer, so it cannot run dry here.
        if let Some(correct) = self.queue.pop() {
            self.shown += 1;
            let question = self.build_question(correct, self.shown);
            self.current = Some(question);
            self.awaiting_advance = false;
        }
    }

    /// Assemble the answer grid for `correct`.
    ///
    /// Shuffles a copy of the pool with the correct answer held out, takes
    /// the first `choice_count - 1` as distractors, appends the correct
    /// answer at the tail, then swaps it into a uniformly random slot.
    fn build_question(&mut self, correct: Candidate, number: usize) -> Question {
        let mut choices: Vec<Candidate> = self
            .pool
            .iter()
            .filter(|c| c.code != correct.code)
            .cloned()
            .collect();
        choices.shuffle(&mut self.rng);
        choices.truncate(self.choice_count - 1);
        choices.push(correct);

        let tail = choices.len() - 1;
        let slot = self.rng.gen_range(0..choices.len());
        choices.swap(slot, tail);

        Question {
            choices,
            correct_index: slot,
            number,
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Bad choice count or empty region set.
    InvalidConfiguration(ConfigError),
    /// Listing a region's candidates failed.
    Candidates(LoadError),
    /// The configured regions yielded no candidates.
    EmptyAnswerPool,
    /// The pool cannot cover a full round and its answer grids.
    InsufficientCandidates { available: usize, required: usize },
    /// There is no question awaiting an answer.
    NoActiveQuestion,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidConfiguration(e) => write!(f, "invalid configuration: {}", e),
            SessionError::Candidates(e) => write!(f, "failed to list candidates: {}", e),
            SessionError::EmptyAnswerPool => {
                write!(f, "no candidates available for the selected regions")
            }
            SessionError::InsufficientCandidates {
                available,
                required,
            } => write!(
                f,
                "only {} candidates available, at least {} are needed",
                available, required
            ),
            SessionError::NoActiveQuestion => write!(f, "no question is awaiting an answer"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidConfiguration(e) => Some(e),
            SessionError::Candidates(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(err: ConfigError) -> Self {
        SessionError::InvalidConfiguration(err)
    }
}

impl From<LoadError> for SessionError {
    fn from(err: LoadError) -> Self {
        SessionError::Candidates(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSource;

    impl CandidateSource for StubSource {
        fn list_candidates(&self, region: &str) -> Result<Vec<Candidate>, LoadError> {
            let sized = |prefix: &str, count: usize| -> Vec<Candidate> {
                (0..count)
                    .map(|i| {
                        Candidate::new(
                            format!("{prefix}{i:02}"),
                            format!("{prefix}land {i}"),
                            region,
                        )
                    })
                    .collect()
            };
            match region {
                "Europe" => Ok(sized("eu", 40)),
                "Africa" => Ok(sized("af", 25)),
                "Tiny" => Ok(sized("ti", 5)),
                "Empty" => Ok(Vec::new()),
                other => Err(LoadError::UnknownRegion(other.to_string())),
            }
        }
    }

    fn config(choice_count: usize, regions: &[&str]) -> QuizConfig {
        QuizConfig::new(choice_count, regions.iter().map(|s| s.to_string()).collect())
    }

    fn configured(choice_count: usize, regions: &[&str]) -> QuizSession {
        let mut session = QuizSession::with_seed(7);
        session
            .configure(&config(choice_count, regions), &StubSource)
            .unwrap();
        session
    }

    /// Answer every flag correctly, returning each question's correct answer.
    fn play_full_round(session: &mut QuizSession) -> (Vec<Candidate>, RoundSummary) {
        let mut corrects = Vec::new();
        loop {
            let correct = session.current_question().unwrap().correct().clone();
            let outcome = session.submit_guess(&correct.name).unwrap();
            corrects.push(correct);
            match outcome {
                GuessOutcome::Correct(token) => {
                    assert!(session.advance(token).is_some());
                }
                GuessOutcome::RoundComplete(summary) => return (corrects, summary),
                GuessOutcome::Incorrect => panic!("correct name judged incorrect"),
            }
        }
    }

    #[test]
    fn configure_rejects_bad_choice_count() {
        let mut session = QuizSession::with_seed(1);
        let err = session
            .configure(&config(4, &["Europe"]), &StubSource)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidConfiguration(ConfigError::InvalidChoiceCount(_))
        ));
    }

    #[test]
    fn configure_rejects_empty_region_set() {
        let mut session = QuizSession::with_seed(1);
        let err = session.configure(&config(3, &[]), &StubSource).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidConfiguration(ConfigError::EmptyRegionSet)
        ));
    }

    #[test]
    fn configure_surfaces_source_errors() {
        let mut session = QuizSession::with_seed(1);
        let err = session
            .configure(&config(3, &["Atlantis"]), &StubSource)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Candidates(LoadError::UnknownRegion(_))
        ));
    }

    #[test]
    fn start_round_requires_candidates() {
        let mut session = configured(3, &["Empty"]);
        assert!(matches!(
            session.start_round().unwrap_err(),
            SessionError::EmptyAnswerPool
        ));
    }

    #[test]
    fn start_round_rejects_undersized_pool() {
        let mut session = configured(3, &["Tiny"]);
        match session.start_round().unwrap_err() {
            SessionError::InsufficientCandidates {
                available,
                required,
            } => {
                assert_eq!(available, 5);
                assert_eq!(required, FLAGS_PER_ROUND);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn start_round_before_configure_fails() {
        let mut session = QuizSession::with_seed(1);
        assert!(matches!(
            session.start_round().unwrap_err(),
            SessionError::EmptyAnswerPool
        ));
    }

    #[test]
    fn round_draws_ten_distinct_pool_members() {
        let mut session = configured(3, &["Europe", "Africa"]);
        session.start_round().unwrap();
        let (corrects, _) = play_full_round(&mut session);

        assert_eq!(corrects.len(), FLAGS_PER_ROUND);
        for (i, a) in corrects.iter().enumerate() {
            assert!(a.code.starts_with("eu") || a.code.starts_with("af"));
            for b in &corrects[i + 1..] {
                assert_ne!(a.code, b.code, "flag drawn twice in one round");
            }
        }
    }

    #[test]
    fn questions_uphold_grid_invariants() {
        for seed in 0..10 {
            let mut session = QuizSession::with_seed(seed);
            session
                .configure(&config(9, &["Europe"]), &StubSource)
                .unwrap();
            session.start_round().unwrap();

            loop {
                let question = session.current_question().unwrap().clone();
                assert_eq!(question.choices().len(), 9);
                assert!(question.correct_index() < 9);

                let correct_code = &question.correct().code;
                let occurrences = question
                    .choices()
                    .iter()
                    .filter(|c| &c.code == correct_code)
                    .count();
                assert_eq!(occurrences, 1, "correct answer must appear exactly once");

                for (i, a) in question.choices().iter().enumerate() {
                    for b in &question.choices()[i + 1..] {
                        assert_ne!(a.code, b.code, "duplicate choice in grid");
                    }
                }

                match session.submit_guess(&question.correct().name).unwrap() {
                    GuessOutcome::Correct(token) => {
                        session.advance(token);
                    }
                    GuessOutcome::RoundComplete(_) => break,
                    GuessOutcome::Incorrect => panic!("correct name judged incorrect"),
                }
            }
        }
    }

    #[test]
    fn correct_guess_increments_both_counters() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        let name = session.current_question().unwrap().correct().name.clone();

        let outcome = session.submit_guess(&name).unwrap();
        assert!(matches!(outcome, GuessOutcome::Correct(_)));
        assert_eq!(
            session.score(),
            ScoreState {
                correct_answers: 1,
                total_guesses: 1
            }
        );
    }

    #[test]
    fn incorrect_guess_increments_only_total() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        let question = session.current_question().unwrap();
        let wrong = question
            .choices()
            .iter()
            .find(|c| c.code != question.correct().code)
            .unwrap()
            .name
            .clone();

        assert_eq!(
            session.submit_guess(&wrong).unwrap(),
            GuessOutcome::Incorrect
        );
        assert_eq!(
            session.score(),
            ScoreState {
                correct_answers: 0,
                total_guesses: 1
            }
        );
        // The question is unchanged and can still be answered.
        let name = session.current_question().unwrap().correct().name.clone();
        assert!(matches!(
            session.submit_guess(&name).unwrap(),
            GuessOutcome::Correct(_)
        ));
    }

    #[test]
    fn perfect_round_scores_one_hundred() {
        let mut session = configured(6, &["Europe"]);
        session.start_round().unwrap();
        let (_, summary) = play_full_round(&mut session);

        assert_eq!(summary.total_guesses, 10);
        assert_eq!(summary.accuracy, 100.0);
        assert_eq!(session.phase(), SessionPhase::RoundComplete);
        assert!(session.current_question().is_none());
        assert!(matches!(
            session.submit_guess("anything").unwrap_err(),
            SessionError::NoActiveQuestion
        ));
    }

    #[test]
    fn wrong_guesses_lower_accuracy() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();

        // Two wrong guesses on the first flag, then a clean run.
        for _ in 0..2 {
            let question = session.current_question().unwrap();
            let wrong = question
                .choices()
                .iter()
                .find(|c| c.code != question.correct().code)
                .unwrap()
                .name
                .clone();
            session.submit_guess(&wrong).unwrap();
        }
        let (_, summary) = play_full_round(&mut session);

        assert_eq!(summary.total_guesses, 12);
        assert_eq!(summary.accuracy, 1000.0 / 12.0);
    }

    #[test]
    fn advance_emits_the_next_question() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        assert_eq!(session.current_question().unwrap().number(), 1);

        let name = session.current_question().unwrap().correct().name.clone();
        let token = match session.submit_guess(&name).unwrap() {
            GuessOutcome::Correct(token) => token,
            other => panic!("unexpected outcome: {other:?}"),
        };

        let next = session.advance(token).unwrap();
        assert_eq!(next.number(), 2);
        assert_eq!(session.score().correct_answers, 1);
    }

    #[test]
    fn submit_is_rejected_while_advance_is_pending() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        let name = session.current_question().unwrap().correct().name.clone();
        session.submit_guess(&name).unwrap();

        assert!(matches!(
            session.submit_guess(&name).unwrap_err(),
            SessionError::NoActiveQuestion
        ));
        assert_eq!(session.score().total_guesses, 1);
    }

    #[test]
    fn restart_invalidates_pending_advance() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        let name = session.current_question().unwrap().correct().name.clone();
        let token = match session.submit_guess(&name).unwrap() {
            GuessOutcome::Correct(token) => token,
            other => panic!("unexpected outcome: {other:?}"),
        };

        session.start_round().unwrap();
        assert!(session.advance(token).is_none());
        // The new round is untouched by the stale token.
        assert_eq!(session.current_question().unwrap().number(), 1);
        assert_eq!(session.score(), ScoreState::default());
    }

    #[test]
    fn reconfigure_invalidates_pending_advance() {
        let mut session = configured(3, &["Europe"]);
        session.start_round().unwrap();
        let name = session.current_question().unwrap().correct().name.clone();
        let token = match session.submit_guess(&name).unwrap() {
            GuessOutcome::Correct(token) => token,
            other => panic!("unexpected outcome: {other:?}"),
        };

        session
            .configure(&config(6, &["Africa"]), &StubSource)
            .unwrap();
        assert!(session.advance(token).is_none());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn duplicate_regions_do_not_duplicate_the_pool() {
        let mut session = QuizSession::with_seed(3);
        session
            .configure(&config(3, &["Europe", "Europe"]), &StubSource)
            .unwrap();
        assert_eq!(session.pool_size(), 40);
    }

    #[test]
    fn guessing_before_a_round_fails() {
        let mut session = configured(3, &["Europe"]);
        assert!(matches!(
            session.submit_guess("France").unwrap_err(),
            SessionError::NoActiveQuestion
        ));
    }
}
