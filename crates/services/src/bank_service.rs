use std::sync::Arc;

use tracing::info;

use storage::repository::QuestionBankRepository;
use trivia_core::Clock;
use trivia_core::model::{AuthoredQuestion, QuestionDraft, QuestionId};

use crate::error::BankServiceError;

/// Orchestrates authored-question CRUD over the single stored bank value.
///
/// Every mutation loads the whole bank, applies the change, and rewrites
/// the value in full; there is no partial write to get wrong.
#[derive(Clone)]
pub struct QuestionBankService {
    clock: Clock,
    bank: Arc<dyn QuestionBankRepository>,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<dyn QuestionBankRepository>) -> Self {
        Self { clock, bank }
    }

    /// List authored questions in stored order.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Storage` on repository failures.
    pub async fn list(&self) -> Result<Vec<AuthoredQuestion>, BankServiceError> {
        Ok(self.bank.load_bank().await?)
    }

    /// Fetch one authored question.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::NotFound` for an unknown id.
    pub async fn get(&self, id: QuestionId) -> Result<AuthoredQuestion, BankServiceError> {
        let bank = self.bank.load_bank().await?;
        bank.into_iter()
            .find(|question| question.id() == id)
            .ok_or(BankServiceError::NotFound { id })
    }

    /// Validate the draft and append it to the bank.
    ///
    /// Ids derive from the creation timestamp in milliseconds, floored at
    /// one past the current maximum so rapid creation cannot collide.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Question` for a rejected draft; nothing is
    /// persisted on validation failure.
    pub async fn create(&self, draft: QuestionDraft) -> Result<QuestionId, BankServiceError> {
        let record = draft.validate()?;
        let mut bank = self.bank.load_bank().await?;
        let id = self.allocate_id(&bank);
        bank.push(AuthoredQuestion::new(id, record));
        self.bank.replace_bank(&bank).await?;
        info!(%id, "authored question created");
        Ok(id)
    }

    /// Replace the record behind `id` with a freshly validated draft.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::Question` for a rejected draft and
    /// `BankServiceError::NotFound` for an unknown id.
    pub async fn update(
        &self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<(), BankServiceError> {
        let record = draft.validate()?;
        let mut bank = self.bank.load_bank().await?;
        let Some(entry) = bank.iter_mut().find(|question| question.id() == id) else {
            return Err(BankServiceError::NotFound { id });
        };
        *entry = AuthoredQuestion::new(id, record);
        self.bank.replace_bank(&bank).await?;
        info!(%id, "authored question updated");
        Ok(())
    }

    /// Remove the question behind `id`.
    ///
    /// # Errors
    ///
    /// Returns `BankServiceError::NotFound` for an unknown id.
    pub async fn delete(&self, id: QuestionId) -> Result<(), BankServiceError> {
        let mut bank = self.bank.load_bank().await?;
        let before = bank.len();
        bank.retain(|question| question.id() != id);
        if bank.len() == before {
            return Err(BankServiceError::NotFound { id });
        }
        self.bank.replace_bank(&bank).await?;
        info!(%id, "authored question deleted");
        Ok(())
    }

    fn allocate_id(&self, bank: &[AuthoredQuestion]) -> QuestionId {
        let now_ms = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        let floor = bank
            .iter()
            .map(|question| question.id().value())
            .max()
            .map_or(0, |max| max + 1);
        QuestionId::new(now_ms.max(floor))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
