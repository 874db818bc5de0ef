mod controller;
mod service;
mod view;

pub use controller::QuizController;
pub use service::QuizService;
pub use view::{QuestionView, QuizOp, QuizSnapshot};
