use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use trivia_core::model::AuthoredQuestion;

use crate::mapping::{decode_bank, encode_bank};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Fixed key the authored-question bank lives under.
///
/// The whole bank is one JSON array beneath this key, read in full at
/// startup and rewritten in full on every create, update, or delete.
pub const QUESTION_BANK_KEY: &str = "trivia.question_bank";

/// Repository contract for the authored-question bank.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Load every authored question.
    ///
    /// An absent bank reads as an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored value cannot be read or decoded.
    async fn load_bank(&self) -> Result<Vec<AuthoredQuestion>, StorageError>;

    /// Replace the whole bank with `questions`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be encoded or written.
    async fn replace_bank(&self, questions: &[AuthoredQuestion]) -> Result<(), StorageError>;
}

/// Bundle of repositories handed to services.
#[derive(Clone)]
pub struct Storage {
    pub question_bank: Arc<dyn QuestionBankRepository>,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Holds the same serialized JSON value a key-value row would, so both
/// implementations exercise the read-all/rewrite-all contract identically.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    bank: Arc<Mutex<Option<String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn value(&self) -> Result<Option<String>, StorageError> {
        self.bank
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| StorageError::Connection("poisoned lock".into()))
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn load_bank(&self) -> Result<Vec<AuthoredQuestion>, StorageError> {
        match self.value()? {
            None => Ok(Vec::new()),
            Some(value) => decode_bank(&value),
        }
    }

    async fn replace_bank(&self, questions: &[AuthoredQuestion]) -> Result<(), StorageError> {
        let value = encode_bank(questions)?;
        let mut guard = self
            .bank
            .lock()
            .map_err(|_| StorageError::Connection("poisoned lock".into()))?;
        *guard = Some(value);
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by the in-memory repository.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            question_bank: Arc::new(InMemoryRepository::new()),
        }
    }
}
