#![forbid(unsafe_code)]

pub mod countdown;
pub mod model;
pub mod session;
pub mod time;

pub use countdown::{Countdown, CountdownTick, DEFAULT_QUESTION_SECONDS};
pub use session::{AnswerOutcome, QuizSession, SessionError, SessionPhase};
pub use time::Clock;
