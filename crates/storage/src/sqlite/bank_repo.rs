use chrono::Utc;
use sqlx::Row;

use trivia_core::model::AuthoredQuestion;

use super::SqliteRepository;
use crate::mapping::{decode_bank, encode_bank};
use crate::repository::{QUESTION_BANK_KEY, QuestionBankRepository, StorageError};

#[async_trait::async_trait]
impl QuestionBankRepository for SqliteRepository {
    async fn load_bank(&self) -> Result<Vec<AuthoredQuestion>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(QUESTION_BANK_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            None => Ok(Vec::new()),
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                decode_bank(&value)
            }
        }
    }

    async fn replace_bank(&self, questions: &[AuthoredQuestion]) -> Result<(), StorageError> {
        let value = encode_bank(questions)?;

        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(QUESTION_BANK_KEY)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
