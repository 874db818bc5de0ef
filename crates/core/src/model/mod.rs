mod ids;
mod question;
mod summary;

pub use ids::{ParseIdError, QuestionId};
pub use question::{
    AuthoredQuestion, Difficulty, NormalizedQuestion, QuestionDraft, QuestionError, QuestionRecord,
};
pub use summary::{QuizSummary, ResultBand, SummaryError};
