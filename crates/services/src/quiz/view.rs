use trivia_core::model::QuizSummary;
use trivia_core::session::{AnswerOutcome, SessionPhase};

/// Presentation-agnostic view of the question under play.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no layout or localization assumptions
///
/// The adapter decides how to number choices and render the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    /// One-based position within the quiz.
    pub number: usize,
    pub total: usize,
    pub text: String,
    /// Choices in their fixed presentation order.
    pub choices: Vec<String>,
    pub category: String,
}

/// Read-only snapshot of the controller after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    pub phase: SessionPhase,
    pub score: u32,
    pub remaining_seconds: u32,
    pub timer_running: bool,
    /// Present in `AwaitingAnswer` and `Graded`.
    pub question: Option<QuestionView>,
    /// Present from the first grading until restart.
    pub last_outcome: Option<AnswerOutcome>,
    /// Present only once the quiz is finished.
    pub summary: Option<QuizSummary>,
}

/// Operations the controller accepts in some phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOp {
    Load,
    SubmitAnswer,
    Tick,
    Advance,
    Restart,
}

impl QuizSnapshot {
    /// The operations that will not be ignored in the current phase.
    ///
    /// Everything else is either a reported load error or a silent no-op.
    #[must_use]
    pub fn valid_operations(&self) -> &'static [QuizOp] {
        match self.phase {
            SessionPhase::Idle => &[QuizOp::Load, QuizOp::Restart],
            SessionPhase::AwaitingAnswer => {
                &[QuizOp::SubmitAnswer, QuizOp::Tick, QuizOp::Restart]
            }
            SessionPhase::Graded => &[QuizOp::Advance, QuizOp::Restart],
            SessionPhase::Finished => &[QuizOp::Restart],
        }
    }
}
