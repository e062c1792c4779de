use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised while turning a question record into a playable question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("correct answer is empty")]
    EmptyCorrectAnswer,

    #[error("answer `{0}` appears more than once")]
    DuplicateAnswer(String),

    #[error("options are not a permutation of the record's answers")]
    OptionsMismatch,
}

//
// ─── LABELS ───────────────────────────────────────────────────────────────────
//

/// Answer layout reported by the question source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Multiple,
    Boolean,
}

/// Difficulty label of a question.
///
/// Unknown labels are kept verbatim so nothing from the source is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other(label.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION RECORD ──────────────────────────────────────────────────────────
//

/// A question as delivered by a question source, before its options are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub difficulty: Difficulty,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl QuestionRecord {
    /// All answers of the record, correct answer first.
    pub fn answers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.correct_answer.as_str())
            .chain(self.incorrect_answers.iter().map(String::as_str))
    }

    /// Check that the record can back a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or correct answer is blank, or if
    /// any answer string is repeated.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        let mut seen = HashSet::new();
        for answer in self.answers() {
            if !seen.insert(answer) {
                return Err(QuestionError::DuplicateAnswer(answer.to_owned()));
            }
        }
        Ok(())
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A question whose option order is fixed for the lifetime of a session.
///
/// `options` is always a permutation of the correct answer plus the incorrect
/// answers. There is no way to reorder it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    category: String,
    kind: QuestionKind,
    difficulty: Difficulty,
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    options: Vec<String>,
}

impl Question {
    /// Build a question from a record and an explicit option order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionsMismatch` if `options` is not a
    /// permutation of the record's answers, or any record validation error.
    pub fn with_options(record: QuestionRecord, options: Vec<String>) -> Result<Self, QuestionError> {
        record.validate()?;

        let mut expected: Vec<&str> = record.answers().collect();
        let mut given: Vec<&str> = options.iter().map(String::as_str).collect();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            return Err(QuestionError::OptionsMismatch);
        }

        Ok(Self {
            category: record.category,
            kind: record.kind,
            difficulty: record.difficulty,
            text: record.question,
            correct_answer: record.correct_answer,
            incorrect_answers: record.incorrect_answers,
            options,
        })
    }

    /// Build a question keeping the record order (correct answer first).
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record is invalid.
    pub fn in_record_order(record: QuestionRecord) -> Result<Self, QuestionError> {
        let options = record.answers().map(str::to_owned).collect();
        Self::with_options(record, options)
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
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
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}
