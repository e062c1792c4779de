//! Question retrieval collaborators.
//!
//! A `QuestionSource` yields raw `QuestionRecord`s. `load_with_fallback` never
//! fails: any source error is logged and replaced by the fixed backup list.

mod backup;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use quiz_core::model::QuestionRecord;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::QuestionSourceError;

pub use backup::backup_questions;

/// Number of questions in a quiz.
pub const DEFAULT_QUESTION_COUNT: usize = 15;

/// Supplies an ordered list of question records.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch a fresh batch of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the batch cannot be produced.
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, QuestionSourceError>;
}

/// Where a loaded batch of questions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOrigin {
    Remote,
    Backup,
}

/// Fetch from `source`, falling back to the backup list on any failure.
///
/// Empty or invalid batches count as failures.
pub async fn load_with_fallback(
    source: &dyn QuestionSource,
) -> (Vec<QuestionRecord>, QuestionOrigin) {
    let fetched = source.fetch().await.and_then(|records| {
        if records.is_empty() {
            return Err(QuestionSourceError::EmptyResult);
        }
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    });

    match fetched {
        Ok(records) => {
            info!(count = records.len(), "loaded questions from source");
            (records, QuestionOrigin::Remote)
        }
        Err(err) => {
            warn!(error = %err, "question fetch failed, using backup questions");
            (backup_questions(), QuestionOrigin::Backup)
        }
    }
}

//
// ─── BACKUP SOURCE ────────────────────────────────────────────────────────────
//

/// Source that always returns the backup list (offline mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupQuestionSource;

#[async_trait]
impl QuestionSource for BackupQuestionSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
        Ok(backup_questions())
    }
}

//
// ─── OPEN TRIVIA DB SOURCE ────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct QuestionSourceConfig {
    pub base_url: String,
    pub amount: usize,
    pub timeout: Duration,
}

impl Default for QuestionSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opentdb.com/api.php".into(),
            amount: DEFAULT_QUESTION_COUNT,
            timeout: Duration::from_secs(10),
        }
    }
}

impl QuestionSourceConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("QUIZ_QUESTION_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let amount = env::var("QUIZ_QUESTION_COUNT")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|amount| *amount > 0)
            .unwrap_or(defaults.amount);
        Self {
            base_url,
            amount,
            timeout: defaults.timeout,
        }
    }
}

/// HTTP source speaking the Open Trivia DB response format.
#[derive(Clone)]
pub struct OpenTdbSource {
    client: Client,
    config: QuestionSourceConfig,
}

impl OpenTdbSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuestionSourceConfig::from_env())
    }

    #[must_use]
    pub fn new(config: QuestionSourceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuestionSourceConfig {
        &self.config
    }
}

#[async_trait]
impl QuestionSource for OpenTdbSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("amount", self.config.amount)])
            .timeout(self.config.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        let body: OpenTdbResponse = response.json().await?;
        body.into_records()
    }
}

#[derive(Debug, Deserialize)]
struct OpenTdbResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<QuestionRecord>,
}

impl OpenTdbResponse {
    fn into_records(self) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
        if self.response_code != 0 {
            return Err(QuestionSourceError::ResponseCode(self.response_code));
        }
        if self.results.is_empty() {
            return Err(QuestionSourceError::EmptyResult);
        }
        Ok(self.results.into_iter().map(decode_record).collect())
    }
}

/// Decode the HTML entities the API embeds in plain-text fields.
fn decode_text(raw: &str) -> String {
    decode_html_entities(raw).into_owned()
}

fn decode_record(record: QuestionRecord) -> QuestionRecord {
    QuestionRecord {
        category: decode_text(&record.category),
        kind: record.kind,
        difficulty: record.difficulty,
        question: decode_text(&record.question),
        correct_answer: decode_text(&record.correct_answer),
        incorrect_answers: record
            .incorrect_answers
            .iter()
            .map(|answer| decode_text(answer))
            .collect(),
    }
}
