#![forbid(unsafe_code)]

mod mapping;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, QuestionBankRepository, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
