use std::sync::Arc;

use storage::repository::Storage;
use trivia_core::Clock;

use crate::bank_service::QuestionBankService;
use crate::error::AppServicesError;
use crate::question_source::{OpenTriviaClient, QuestionSource};
use crate::quiz::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    question_bank: Arc<QuestionBankService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the public question
    /// bank.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        question_seconds: u32,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let source: Arc<dyn QuestionSource> = Arc::new(OpenTriviaClient::new());
        Ok(Self::new(&storage, source, clock, question_seconds))
    }

    /// Build services from explicit parts, useful for tests.
    #[must_use]
    pub fn new(
        storage: &Storage,
        source: Arc<dyn QuestionSource>,
        clock: Clock,
        question_seconds: u32,
    ) -> Self {
        let quiz = Arc::new(QuizService::new(source).with_question_seconds(question_seconds));
        let question_bank = Arc::new(QuestionBankService::new(
            clock,
            Arc::clone(&storage.question_bank),
        ));
        Self {
            quiz,
            question_bank,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.question_bank)
    }
}
