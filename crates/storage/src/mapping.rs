use serde::{Deserialize, Serialize};

use trivia_core::model::{AuthoredQuestion, Difficulty, QuestionId, QuestionRecord};

use crate::repository::StorageError;

/// Persisted shape of one authored question.
///
/// Field names keep the original camelCase bank format, so an exported
/// value stays readable by anything that consumed the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredQuestion {
    pub id: u64,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub difficulty: Difficulty,
    pub category: String,
}

impl StoredQuestion {
    pub(crate) fn from_domain(question: &AuthoredQuestion) -> Self {
        let record = question.record();
        Self {
            id: question.id().value(),
            question: record.text().to_owned(),
            correct_answer: record.correct_answer().to_owned(),
            incorrect_answers: record.incorrect_answers().to_vec(),
            difficulty: record.difficulty(),
            category: record.category().to_owned(),
        }
    }

    pub(crate) fn into_domain(self) -> Result<AuthoredQuestion, StorageError> {
        let record = QuestionRecord::new(
            self.question,
            self.correct_answer,
            self.incorrect_answers,
            self.category,
            self.difficulty,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(AuthoredQuestion::new(QuestionId::new(self.id), record))
    }
}

/// Serialize the whole bank into the single stored JSON array.
pub(crate) fn encode_bank(questions: &[AuthoredQuestion]) -> Result<String, StorageError> {
    let stored: Vec<StoredQuestion> = questions.iter().map(StoredQuestion::from_domain).collect();
    serde_json::to_string(&stored).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode the stored JSON array back into domain questions.
pub(crate) fn decode_bank(value: &str) -> Result<Vec<AuthoredQuestion>, StorageError> {
    let stored: Vec<StoredQuestion> =
        serde_json::from_str(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    stored.into_iter().map(StoredQuestion::into_domain).collect()
}
