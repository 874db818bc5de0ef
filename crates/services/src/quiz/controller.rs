use tracing::debug;

use trivia_core::countdown::{Countdown, CountdownTick};
use trivia_core::model::NormalizedQuestion;
use trivia_core::session::{QuizSession, SessionError, SessionPhase};

use super::view::{QuestionView, QuizSnapshot};

/// Owns exactly one session and one countdown, and routes every mutation
/// through itself so the countdown is cancelled on each exit from
/// `AwaitingAnswer`. A timer left running across a transition could grade
/// the wrong question or double-grade; the routing makes that impossible.
///
/// Tick and answer events arrive as discrete calls on one logical thread.
/// Whichever of `{tick-to-expiry, submit}` lands first wins; the loser hits
/// the session's phase guard and becomes a no-op.
#[derive(Debug, Clone)]
pub struct QuizController {
    session: QuizSession,
    countdown: Countdown,
    question_seconds: u32,
}

impl QuizController {
    #[must_use]
    pub fn new(question_seconds: u32) -> Self {
        Self {
            session: QuizSession::new(),
            countdown: Countdown::stopped(),
            question_seconds,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Load a batch and start the clock on the first question.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from `QuizSession::load`; the countdown
    /// stays stopped on failure.
    pub fn load(&mut self, questions: Vec<NormalizedQuestion>) -> Result<(), SessionError> {
        self.session.load(questions)?;
        self.countdown = Countdown::start(self.question_seconds);
        Ok(())
    }

    /// Submit the player's choice.
    ///
    /// A stale submission (already graded, finished, or idle) changes
    /// nothing; the running countdown, if any, is left alone.
    pub fn submit_answer(&mut self, choice: &str) -> QuizSnapshot {
        if self.session.submit_answer(choice).is_some() {
            self.countdown.cancel();
        }
        self.snapshot()
    }

    /// Feed one elapsed second.
    ///
    /// On expiry the current question is graded as unanswered; the expired
    /// countdown has already stopped itself, so the signal fires once.
    pub fn tick(&mut self) -> QuizSnapshot {
        if self.countdown.tick() == CountdownTick::Expired {
            debug!(index = self.session.current_index(), "countdown expired");
            self.session.timeout();
        }
        self.snapshot()
    }

    /// Step past the graded question, restarting the clock for the next one.
    pub fn advance(&mut self) -> QuizSnapshot {
        match self.session.advance() {
            Some(SessionPhase::AwaitingAnswer) => {
                self.countdown = Countdown::start(self.question_seconds);
            }
            Some(_) => self.countdown.cancel(),
            // Stale advance: the session refused, leave the clock alone.
            None => {}
        }
        self.snapshot()
    }

    /// Drop everything back to `Idle`. The old countdown can never fire.
    pub fn restart(&mut self) -> QuizSnapshot {
        self.countdown.cancel();
        self.session.restart();
        self.snapshot()
    }

    /// Read-only state for rendering, rebuilt after every transition.
    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let question = self.session.current_question().map(|q| QuestionView {
            number: self.session.current_index() + 1,
            total: self.session.total_questions(),
            text: q.record().text().to_owned(),
            choices: q.choices().to_vec(),
            category: q.record().category().to_owned(),
        });

        QuizSnapshot {
            phase: self.session.phase(),
            score: self.session.score(),
            remaining_seconds: self.countdown.remaining_seconds(),
            timer_running: self.countdown.is_running(),
            question,
            last_outcome: self.session.last_outcome().cloned(),
            summary: self.session.summary(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::{Difficulty, QuestionRecord, ResultBand};

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
            format!("wrong-{n}-b"),
            format!("right-{n}"),
            format!("wrong-{n}-a"),
        ];
        NormalizedQuestion::new(record, choices).unwrap()
    }

    fn loaded_controller(total: u32, seconds: u32) -> QuizController {
        let mut controller = QuizController::new(seconds);
        controller
            .load((1..=total).map(build_question).collect())
            .unwrap();
        controller
    }

    #[test]
    fn load_starts_the_clock() {
        let controller = loaded_controller(2, 30);
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(snapshot.remaining_seconds, 30);
        assert!(snapshot.timer_running);
        assert_eq!(snapshot.question.as_ref().unwrap().number, 1);
        assert_eq!(snapshot.question.as_ref().unwrap().total, 2);
    }

    #[test]
    fn submitting_stops_the_clock() {
        let mut controller = loaded_controller(2, 30);

        let snapshot = controller.submit_answer("right-1");
        assert_eq!(snapshot.phase, SessionPhase::Graded);
        assert!(!snapshot.timer_running);
        assert_eq!(snapshot.score, 1);
    }

    #[test]
    fn ticks_after_grading_never_regrade() {
        let mut controller = loaded_controller(1, 3);
        controller.submit_answer("right-1");

        for _ in 0..10 {
            controller.tick();
        }

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Graded);
        assert_eq!(snapshot.score, 1);
        assert_eq!(
            snapshot.last_outcome.as_ref().unwrap().selected.as_deref(),
            Some("right-1")
        );
    }

    #[test]
    fn expiry_grades_as_unanswered() {
        let mut controller = loaded_controller(1, 3);

        controller.tick();
        controller.tick();
        let snapshot = controller.tick();

        assert_eq!(snapshot.phase, SessionPhase::Graded);
        assert_eq!(snapshot.score, 0);
        let outcome = snapshot.last_outcome.unwrap();
        assert_eq!(outcome.selected, None);
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "right-1");
    }

    #[test]
    fn submission_after_expiry_is_ignored() {
        let mut controller = loaded_controller(1, 1);

        controller.tick();
        let snapshot = controller.submit_answer("right-1");

        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.last_outcome.unwrap().selected, None);
    }

    #[test]
    fn advance_restarts_the_clock_for_the_next_question() {
        let mut controller = loaded_controller(2, 30);
        controller.submit_answer("right-1");

        // Run some seconds off the cancelled clock to prove the restart is
        // a fresh countdown, not a resume.
        controller.tick();
        controller.tick();

        let snapshot = controller.advance();
        assert_eq!(snapshot.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(snapshot.remaining_seconds, 30);
        assert!(snapshot.timer_running);
        assert_eq!(snapshot.question.unwrap().number, 2);
    }

    #[test]
    fn stale_advance_leaves_the_clock_running() {
        let mut controller = loaded_controller(1, 30);

        let snapshot = controller.advance();
        assert_eq!(snapshot.phase, SessionPhase::AwaitingAnswer);
        assert!(snapshot.timer_running);
        assert_eq!(snapshot.remaining_seconds, 30);
    }

    #[test]
    fn finishing_leaves_the_clock_stopped() {
        let mut controller = loaded_controller(1, 30);
        controller.submit_answer("right-1");

        let snapshot = controller.advance();
        assert_eq!(snapshot.phase, SessionPhase::Finished);
        assert!(!snapshot.timer_running);
        assert!(snapshot.question.is_none());
        assert_eq!(snapshot.summary.unwrap().score(), 1);
    }

    #[test]
    fn mixed_two_question_run_lands_on_fifty_percent() {
        let mut controller = loaded_controller(2, 2);

        controller.submit_answer("right-1");
        controller.advance();
        controller.tick();
        controller.tick();
        let snapshot = controller.advance();

        assert_eq!(snapshot.phase, SessionPhase::Finished);
        let summary = snapshot.summary.unwrap();
        assert_eq!(summary.score(), 1);
        assert!((summary.percentage() - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.band(), ResultBand::Good);
    }

    #[test]
    fn snapshot_advertises_the_valid_operations() {
        use super::super::view::QuizOp;

        let mut controller = loaded_controller(1, 30);
        assert!(
            controller
                .snapshot()
                .valid_operations()
                .contains(&QuizOp::SubmitAnswer)
        );

        controller.submit_answer("right-1");
        assert_eq!(
            controller.snapshot().valid_operations(),
            &[QuizOp::Advance, QuizOp::Restart]
        );

        controller.advance();
        assert_eq!(
            controller.snapshot().valid_operations(),
            &[QuizOp::Restart]
        );
    }

    #[test]
    fn restart_returns_to_idle_with_a_dead_clock() {
        let mut controller = loaded_controller(3, 30);
        controller.submit_answer("right-1");

        let snapshot = controller.restart();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.score, 0);
        assert!(!snapshot.timer_running);
        assert!(snapshot.question.is_none());

        // A tick against the dead clock must not grade anything.
        let snapshot = controller.tick();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.last_outcome.is_none());
    }
}
