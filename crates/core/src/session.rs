//! The quiz session state machine.
//!
//! Phases move `Idle → AwaitingAnswer → Graded → AwaitingAnswer … →
//! Finished`, with `restart` the only way back to `Idle`. Every mutation is
//! phase-guarded: grading and advancing from the wrong phase return `None`
//! and change nothing, so duplicate submissions and late timer signals are
//! harmless no matter which arrives first.

use thiserror::Error;

use crate::model::{NormalizedQuestion, QuizSummary};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors reported by `QuizSession::load`.
///
/// Load is user-triggered, so its failures are reported; the silent
/// stale-transition guards cover only the in-quiz operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot load an empty question batch")]
    EmptyBatch,

    #[error("a quiz is already in progress")]
    AlreadyActive,
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No questions loaded.
    #[default]
    Idle,
    /// The current question is shown and may be answered.
    AwaitingAnswer,
    /// The current question is locked in and the correct choice revealed.
    Graded,
    /// All questions graded; the summary is readable.
    Finished,
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// How a single question was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// The choice the player picked, or `None` when the countdown expired.
    pub selected: Option<String>,
    pub is_correct: bool,
    /// The correct answer, carried here so grading views need no lookup.
    pub correct_answer: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Owns the question list, the cursor, the score, and the outcome log, and
/// routes every mutation through phase-guarded operations.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<NormalizedQuestion>,
    current_index: usize,
    score: u32,
    phase: SessionPhase,
    outcomes: Vec<AnswerOutcome>,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Zero-based index of the question currently shown or graded.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// The question under the cursor, present in `AwaitingAnswer` and
    /// `Graded`.
    #[must_use]
    pub fn current_question(&self) -> Option<&NormalizedQuestion> {
        match self.phase {
            SessionPhase::AwaitingAnswer | SessionPhase::Graded => {
                self.questions.get(self.current_index)
            }
            SessionPhase::Idle | SessionPhase::Finished => None,
        }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[AnswerOutcome] {
        &self.outcomes
    }

    /// Outcome of the most recently graded question.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.outcomes.last()
    }

    /// Load a batch and show the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyBatch` for an empty batch and
    /// `SessionError::AlreadyActive` outside `Idle`. Either way the session
    /// is left exactly as it was.
    pub fn load(&mut self, questions: Vec<NormalizedQuestion>) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyActive);
        }
        if questions.is_empty() {
            return Err(SessionError::EmptyBatch);
        }

        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.outcomes.clear();
        self.phase = SessionPhase::AwaitingAnswer;
        Ok(())
    }

    /// Grade the current question against `choice` (exact string match).
    ///
    /// Returns the recorded outcome, or `None` when the session is not
    /// awaiting an answer; a stale call changes nothing.
    pub fn submit_answer(&mut self, choice: &str) -> Option<&AnswerOutcome> {
        self.grade(Some(choice.to_owned()))
    }

    /// Grade the current question as unanswered after the countdown expired.
    ///
    /// Never counts as correct. Same stale guard as `submit_answer`.
    pub fn timeout(&mut self) -> Option<&AnswerOutcome> {
        self.grade(None)
    }

    fn grade(&mut self, selected: Option<String>) -> Option<&AnswerOutcome> {
        if self.phase != SessionPhase::AwaitingAnswer {
            return None;
        }
        let question = self.questions.get(self.current_index)?;

        let is_correct = selected
            .as_deref()
            .is_some_and(|choice| question.is_correct(choice));
        if is_correct {
            self.score += 1;
        }

        self.outcomes.push(AnswerOutcome {
            selected,
            is_correct,
            correct_answer: question.record().correct_answer().to_owned(),
        });
        self.phase = SessionPhase::Graded;
        self.outcomes.last()
    }

    /// Step past the graded question.
    ///
    /// Returns the phase entered: `AwaitingAnswer` for the next question or
    /// `Finished` past the last one. `None` when not in `Graded`.
    pub fn advance(&mut self) -> Option<SessionPhase> {
        if self.phase != SessionPhase::Graded {
            return None;
        }

        self.current_index += 1;
        self.phase = if self.current_index >= self.questions.len() {
            SessionPhase::Finished
        } else {
            SessionPhase::AwaitingAnswer
        };
        Some(self.phase)
    }

    /// Drop all session state and return to `Idle`. Valid from any phase.
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    /// Final summary, readable only once finished.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        if self.phase != SessionPhase::Finished {
            return None;
        }
        let total = u32::try_from(self.questions.len()).ok()?;
        QuizSummary::new(self.score, total).ok()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionRecord, ResultBand};

    fn build_question(n: u32) -> NormalizedQuestion {
        let record = QuestionRecord::new(
            format!("Question {n}?"),
            format!("right-{n}"),
            vec![format!("wrong-{n}-a"), format!("wrong-{n}-b")],
            "General Knowledge",
            Difficulty::Easy,
        )
        .unwrap();
        let choices = vec![
            format!("wrong-{n}-a"),
            format!("right-{n}"),
            format!("wrong-{n}-b"),
        ];
        NormalizedQuestion::new(record, choices).unwrap()
    }

    fn loaded_session(n: u32) -> QuizSession {
        let mut session = QuizSession::new();
        session
            .load((1..=n).map(build_question).collect())
            .unwrap();
        session
    }

    #[test]
    fn load_starts_at_first_question() {
        let session = loaded_session(3);

        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_questions(), 3);
        assert!(session.current_question().is_some());
    }

    #[test]
    fn load_rejects_empty_batch() {
        let mut session = QuizSession::new();
        assert_eq!(session.load(Vec::new()), Err(SessionError::EmptyBatch));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn load_rejects_active_session() {
        let mut session = loaded_session(1);
        assert_eq!(
            session.load(vec![build_question(9)]),
            Err(SessionError::AlreadyActive)
        );
        assert_eq!(session.total_questions(), 1);
    }

    #[test]
    fn correct_answer_scores_and_grades() {
        let mut session = loaded_session(2);

        let outcome = session.submit_answer("right-1").unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.selected.as_deref(), Some("right-1"));
        assert_eq!(session.score(), 1);
        assert_eq!(session.phase(), SessionPhase::Graded);
    }

    #[test]
    fn wrong_answer_grades_without_scoring() {
        let mut session = loaded_session(2);

        let outcome = session.submit_answer("wrong-1-a").unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "right-1");
        assert_eq!(session.score(), 0);
        assert_eq!(session.phase(), SessionPhase::Graded);
    }

    #[test]
    fn double_submit_is_a_silent_no_op() {
        let mut session = loaded_session(2);

        session.submit_answer("right-1").unwrap();
        assert!(session.submit_answer("right-1").is_none());
        assert_eq!(session.score(), 1);
        assert_eq!(session.outcomes().len(), 1);
    }

    #[test]
    fn timeout_matches_a_non_matching_submission() {
        let mut timed_out = loaded_session(1);
        let mut missed = loaded_session(1);

        let timeout_outcome = timed_out.timeout().unwrap().clone();
        let missed_outcome = missed.submit_answer("nothing-matches-this").unwrap().clone();

        assert!(!timeout_outcome.is_correct);
        assert!(!missed_outcome.is_correct);
        assert_eq!(timeout_outcome.selected, None);
        assert_eq!(timed_out.score(), missed.score());
        assert_eq!(timed_out.phase(), missed.phase());
    }

    #[test]
    fn timeout_after_grading_is_ignored() {
        let mut session = loaded_session(1);

        session.submit_answer("right-1").unwrap();
        assert!(session.timeout().is_none());
        assert_eq!(session.score(), 1);
        assert_eq!(session.outcomes().len(), 1);
    }

    #[test]
    fn advance_outside_graded_is_ignored() {
        let mut session = loaded_session(1);
        assert!(session.advance().is_none());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn full_run_finishes_with_bounded_score() {
        let total = 4;
        let mut session = loaded_session(total);

        for _ in 0..total {
            session.submit_answer("never-right").unwrap();
            session.advance().unwrap();
        }

        assert_eq!(session.phase(), SessionPhase::Finished);
        let summary = session.summary().unwrap();
        assert!(summary.score() <= summary.total());
        assert_eq!(summary.total(), total);
    }

    #[test]
    fn mixed_run_scores_one_of_two() {
        let mut session = loaded_session(2);

        session.submit_answer("right-1").unwrap();
        assert_eq!(session.advance(), Some(SessionPhase::AwaitingAnswer));
        session.timeout().unwrap();
        assert_eq!(session.advance(), Some(SessionPhase::Finished));

        let summary = session.summary().unwrap();
        assert_eq!(summary.score(), 1);
        assert!((summary.percentage() - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.band(), ResultBand::Good);
    }

    #[test]
    fn summary_is_unreadable_before_finish() {
        let mut session = loaded_session(2);
        assert!(session.summary().is_none());
        session.submit_answer("right-1").unwrap();
        assert!(session.summary().is_none());
    }

    #[test]
    fn restart_clears_everything() {
        let mut session = loaded_session(5);
        for _ in 0..5 {
            session.submit_answer("right-1").unwrap();
            session.advance().unwrap();
        }
        assert_eq!(session.phase(), SessionPhase::Finished);

        session.restart();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_questions(), 0);
        assert!(session.outcomes().is_empty());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn restart_mid_quiz_allows_a_fresh_load() {
        let mut session = loaded_session(3);
        session.submit_answer("right-1").unwrap();

        session.restart();
        session.load(vec![build_question(7)]).unwrap();

        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(session.total_questions(), 1);
        assert_eq!(session.score(), 0);
    }
}
