use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use trivia_core::model::Difficulty;

use crate::error::FetchError;

/// Default number of questions per fetch.
pub const DEFAULT_AMOUNT: u32 = 10;

/// Default bank category (Science & Nature).
pub const DEFAULT_CATEGORY: u32 = 17;

/// Base URL of the public question bank.
pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";

/// Parameters for one batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionQuery {
    pub amount: u32,
    pub category: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

impl Default for QuestionQuery {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT,
            category: Some(DEFAULT_CATEGORY),
            difficulty: Some(Difficulty::Easy),
        }
    }
}

/// One record as delivered by the bank, entities still escaped.
///
/// Deserialization is strict about the fields the quiz needs: a result
/// missing any of them fails the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
struct BankResponse {
    response_code: i64,
    results: Vec<RawQuestion>,
}

fn batch_from_response(body: BankResponse) -> Result<Vec<RawQuestion>, FetchError> {
    if body.response_code != 0 {
        return Err(FetchError::Api {
            code: body.response_code,
        });
    }
    Ok(body.results)
}

/// Source of raw question batches.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch one ordered batch.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, an error HTTP status, a
    /// non-zero bank response code, or a malformed body.
    async fn fetch_batch(&self, query: QuestionQuery) -> Result<Vec<RawQuestion>, FetchError>;
}

/// Client for the Open Trivia DB HTTP API.
#[derive(Clone)]
pub struct OpenTriviaClient {
    client: Client,
    base_url: String,
}

impl OpenTriviaClient {
    /// Client against the default bank, honoring `TRIVIA_API_URL`.
    #[must_use]
    pub fn new() -> Self {
        let base_url = env::var("TRIVIA_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::with_base_url(base_url)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request_url(&self, query: QuestionQuery) -> String {
        use std::fmt::Write;

        let mut url = format!(
            "{}/api.php?amount={}",
            self.base_url.trim_end_matches('/'),
            query.amount
        );
        if let Some(category) = query.category {
            let _ = write!(url, "&category={category}");
        }
        if let Some(difficulty) = query.difficulty {
            let _ = write!(url, "&difficulty={difficulty}");
        }
        url
    }
}

impl Default for OpenTriviaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaClient {
    async fn fetch_batch(&self, query: QuestionQuery) -> Result<Vec<RawQuestion>, FetchError> {
        let url = self.request_url(query);
        debug!(%url, "requesting question batch");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: BankResponse = response.json().await?;
        let batch = batch_from_response(body)?;
        info!(count = batch.len(), "fetched question batch");
        Ok(batch)
    }
}
