//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trivia_core::model::{QuestionError, QuestionId};
use trivia_core::session::SessionError;

/// Errors emitted while fetching a question batch from the remote bank.
///
/// Every variant is fatal to the load attempt: the error is reported, the
/// session stays idle, and nothing is retried automatically.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("question bank returned response code {code}")]
    Api { code: i64 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuizService` when starting a quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizStartError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Bank(#[from] BankServiceError),
}

/// Errors emitted by `QuestionBankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankServiceError {
    #[error("no authored question with id {id}")]
    NotFound { id: QuestionId },

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
