#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_service;
pub mod error;
pub mod normalizer;
pub mod question_source;
pub mod quiz;

pub use trivia_core::Clock;

pub use app_services::AppServices;
pub use bank_service::QuestionBankService;
pub use error::{AppServicesError, BankServiceError, FetchError, QuizStartError};
pub use question_source::{OpenTriviaClient, QuestionQuery, QuestionSource, RawQuestion};
pub use quiz::{QuestionView, QuizController, QuizOp, QuizService, QuizSnapshot};
