use std::sync::Arc;

use rand::rng;
use tracing::info;

use trivia_core::countdown::DEFAULT_QUESTION_SECONDS;
use trivia_core::model::NormalizedQuestion;

use crate::bank_service::QuestionBankService;
use crate::error::QuizStartError;
use crate::normalizer;
use crate::question_source::{QuestionQuery, QuestionSource};
use crate::quiz::controller::QuizController;

/// Builds loaded quiz controllers from either question source.
#[derive(Clone)]
pub struct QuizService {
    source: Arc<dyn QuestionSource>,
    question_seconds: u32,
}

impl QuizService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            question_seconds: DEFAULT_QUESTION_SECONDS,
        }
    }

    /// Override the per-question countdown duration.
    #[must_use]
    pub fn with_question_seconds(mut self, seconds: u32) -> Self {
        self.question_seconds = seconds;
        self
    }

    /// Fetch a batch from the remote bank and start a quiz on it.
    ///
    /// # Errors
    ///
    /// Returns `QuizStartError` when the fetch fails, a record is malformed,
    /// or the batch is empty. No partial state survives a failure; the
    /// caller still has no controller.
    pub async fn start_quiz(&self, query: QuestionQuery) -> Result<QuizController, QuizStartError> {
        let batch = self.source.fetch_batch(query).await?;
        let mut rng = rng();
        let questions = normalizer::normalize_batch(&batch, &mut rng)?;
        self.start_with(questions)
    }

    /// Start a quiz from the locally authored bank.
    ///
    /// Authored text is stored decoded, so only the choice shuffle applies.
    ///
    /// # Errors
    ///
    /// Returns `QuizStartError` when the bank cannot be read or is empty.
    pub async fn start_from_bank(
        &self,
        bank: &QuestionBankService,
    ) -> Result<QuizController, QuizStartError> {
        let authored = bank.list().await?;
        let mut rng = rng();
        let questions = authored
            .into_iter()
            .map(|question| normalizer::normalize_record(question.into_record(), &mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        self.start_with(questions)
    }

    fn start_with(
        &self,
        questions: Vec<NormalizedQuestion>,
    ) -> Result<QuizController, QuizStartError> {
        let total = questions.len();
        let mut controller = QuizController::new(self.question_seconds);
        controller.load(questions)?;
        info!(total, seconds = self.question_seconds, "quiz started");
        Ok(controller)
    }
}
