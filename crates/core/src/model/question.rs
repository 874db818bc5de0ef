use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("at least one incorrect answer is required")]
    NoIncorrectAnswers,

    #[error("incorrect answer {index} is empty")]
    EmptyIncorrectAnswer { index: usize },

    #[error("category cannot be empty")]
    EmptyCategory,

    #[error("unknown difficulty: {raw}")]
    UnknownDifficulty { raw: String },

    #[error("shuffled choices are not a permutation of the answers")]
    ChoiceMismatch,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Question difficulty as reported by the question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuestionError::UnknownDifficulty {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// A single multiple-choice question, immutable once built.
///
/// The record carries decoded text only; entity decoding happens before
/// construction so nothing downstream has to care about escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    category: String,
    difficulty: Difficulty,
}

impl QuestionRecord {
    /// Build a validated record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text, the correct answer, the
    /// category, or any incorrect answer is blank, or when no incorrect
    /// answers are given. Nothing is repaired; a bad field fails the whole
    /// record.
    pub fn new(
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let correct_answer = correct_answer.into();
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        if incorrect_answers.is_empty() {
            return Err(QuestionError::NoIncorrectAnswers);
        }
        for (index, answer) in incorrect_answers.iter().enumerate() {
            if answer.trim().is_empty() {
                return Err(QuestionError::EmptyIncorrectAnswer { index });
            }
        }

        let category = category.into();
        if category.trim().is_empty() {
            return Err(QuestionError::EmptyCategory);
        }

        Ok(Self {
            text,
            correct_answer,
            incorrect_answers,
            category,
            difficulty,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Number of choices this question offers.
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.incorrect_answers.len() + 1
    }
}

//
// ─── QUESTION DRAFT ────────────────────────────────────────────────────────────
//

/// Form input for an authored question.
///
/// Drafts hold whatever the user typed; `validate` turns them into a
/// `QuestionRecord` or reports the first missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    /// Validate the draft into an immutable record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for any missing required field. The draft is
    /// consumed either way; the caller re-collects input on failure.
    pub fn validate(self) -> Result<QuestionRecord, QuestionError> {
        QuestionRecord::new(
            self.text,
            self.correct_answer,
            self.incorrect_answers,
            self.category,
            self.difficulty,
        )
    }
}

//
// ─── NORMALIZED QUESTION ───────────────────────────────────────────────────────
//

/// A question ready for play: the record plus a fixed choice order.
///
/// The choice order is computed once at load time and never changes for the
/// lifetime of the question; re-rendering must not reshuffle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuestion {
    record: QuestionRecord,
    shuffled_choices: Vec<String>,
}

impl NormalizedQuestion {
    /// Pair a record with its shuffled choice list.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::ChoiceMismatch` unless `shuffled_choices` is a
    /// permutation of the correct answer plus all incorrect answers, with the
    /// correct answer appearing exactly once.
    pub fn new(
        record: QuestionRecord,
        shuffled_choices: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let mut expected: Vec<&str> = Vec::with_capacity(record.choice_count());
        expected.push(record.correct_answer());
        expected.extend(record.incorrect_answers().iter().map(String::as_str));
        expected.sort_unstable();

        let mut provided: Vec<&str> = shuffled_choices.iter().map(String::as_str).collect();
        provided.sort_unstable();

        if expected != provided {
            return Err(QuestionError::ChoiceMismatch);
        }

        Ok(Self {
            record,
            shuffled_choices,
        })
    }

    #[must_use]
    pub fn record(&self) -> &QuestionRecord {
        &self.record
    }

    /// Choices in presentation order.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.shuffled_choices
    }

    /// True when `choice` matches the correct answer exactly.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.record.correct_answer() == choice
    }
}

//
// ─── AUTHORED QUESTION ─────────────────────────────────────────────────────────
//

/// A user-authored question stored in the local bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredQuestion {
    id: QuestionId,
    record: QuestionRecord,
}

impl AuthoredQuestion {
    #[must_use]
    pub fn new(id: QuestionId, record: QuestionRecord) -> Self {
        Self { id, record }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn record(&self) -> &QuestionRecord {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> QuestionRecord {
        self.record
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_record() -> QuestionRecord {
        QuestionRecord::new(
            "What is the chemical symbol for gold?",
            "Au",
            vec!["Ag".into(), "Fe".into(), "Pb".into()],
            "Science & Nature",
            Difficulty::Easy,
        )
        .unwrap()
    }

    #[test]
    fn record_rejects_blank_text() {
        let err = QuestionRecord::new(
            "   ",
            "Au",
            vec!["Ag".into()],
            "Science",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn record_rejects_blank_correct_answer() {
        let err = QuestionRecord::new(
            "Q",
            "",
            vec!["Ag".into()],
            "Science",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyCorrectAnswer);
    }

    #[test]
    fn record_rejects_missing_incorrect_answers() {
        let err =
            QuestionRecord::new("Q", "Au", Vec::new(), "Science", Difficulty::Easy).unwrap_err();
        assert_eq!(err, QuestionError::NoIncorrectAnswers);

        let err = QuestionRecord::new(
            "Q",
            "Au",
            vec!["Ag".into(), " ".into()],
            "Science",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyIncorrectAnswer { index: 1 });
    }

    #[test]
    fn draft_validates_into_record() {
        let draft = QuestionDraft {
            text: "Q".into(),
            correct_answer: "A".into(),
            incorrect_answers: vec!["B".into(), "C".into()],
            category: "General".into(),
            difficulty: Difficulty::Medium,
        };
        let record = draft.validate().unwrap();
        assert_eq!(record.correct_answer(), "A");
        assert_eq!(record.choice_count(), 3);
    }

    #[test]
    fn difficulty_parses_and_displays() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert!(matches!(
            "brutal".parse::<Difficulty>(),
            Err(QuestionError::UnknownDifficulty { .. })
        ));
    }

    #[test]
    fn normalized_question_accepts_any_permutation() {
        let record = build_record();
        let choices = vec!["Fe".into(), "Au".into(), "Pb".into(), "Ag".into()];
        let question = NormalizedQuestion::new(record, choices).unwrap();

        assert!(question.is_correct("Au"));
        assert!(!question.is_correct("Ag"));
        assert_eq!(question.choices().len(), 4);
    }

    #[test]
    fn normalized_question_rejects_missing_choice() {
        let record = build_record();
        let err = NormalizedQuestion::new(record, vec!["Au".into(), "Ag".into(), "Fe".into()])
            .unwrap_err();
        assert_eq!(err, QuestionError::ChoiceMismatch);
    }

    #[test]
    fn normalized_question_rejects_duplicated_correct_answer() {
        let record = build_record();
        let err = NormalizedQuestion::new(
            record,
            vec!["Au".into(), "Au".into(), "Fe".into(), "Pb".into()],
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::ChoiceMismatch);
    }
}
