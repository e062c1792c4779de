use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::{Question, QuizSnapshot};
use crate::time::elapsed_secs;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("question index {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },

    #[error("`{option}` is not an option of question {index}")]
    InvalidOption { index: usize, option: String },
}

//
// ─── DERIVED VIEWS ────────────────────────────────────────────────────────────
//

/// Per-question flags for the overview panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionStatus {
    pub index: usize,
    pub answered: bool,
    pub bookmarked: bool,
    pub current: bool,
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub bookmarked: usize,
    pub current: usize,
}

/// Counts a caller needs to decide whether a manual submit must be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionCheck {
    pub unanswered: usize,
    pub bookmarked: usize,
}

impl SubmissionCheck {
    #[must_use]
    pub fn needs_confirmation(&self) -> bool {
        self.unanswered > 0 || self.bookmarked > 0
    }

    /// Confirmation message for a manual submit, or `None` when nothing is pending.
    #[must_use]
    pub fn prompt(&self) -> Option<String> {
        match (self.unanswered, self.bookmarked) {
            (0, 0) => None,
            (unanswered, 0) => Some(format!(
                "You have {unanswered} unanswered questions. Do you want to submit anyway?"
            )),
            (0, bookmarked) => Some(format!(
                "You have {bookmarked} bookmarked questions. Do you want to submit anyway?"
            )),
            (unanswered, bookmarked) => Some(format!(
                "You have {unanswered} unanswered questions and {bookmarked} bookmarked questions. Do you want to submit anyway?"
            )),
        }
    }
}

//
// ─── SESSION STATE ────────────────────────────────────────────────────────────
//

/// Mutable state of one quiz attempt.
///
/// Invariants held by every method:
/// - `answers.len() == questions.len()`
/// - every recorded answer is one of that question's options
/// - `current < questions.len()`
/// - bookmarks and timed indices are in range
///
/// Timestamps are passed in by the caller so the services layer clock stays the
/// single source of time.
#[derive(Debug, Clone)]
pub struct SessionState {
    questions: Vec<Question>,
    current: usize,
    answers: Vec<Option<String>>,
    bookmarks: BTreeSet<usize>,
    question_times: BTreeMap<usize, u64>,
    started_at: DateTime<Utc>,
    entered_at: DateTime<Utc>,
}

impl SessionState {
    /// Start a session on the first question with nothing answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(questions: Vec<Question>, now: DateTime<Utc>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            questions,
            current: 0,
            answers,
            bookmarks: BTreeSet::new(),
            question_times: BTreeMap::new(),
            started_at: now,
            entered_at: now,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions in the quiz. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BTreeSet<usize> {
        &self.bookmarks
    }

    #[must_use]
    pub fn is_bookmarked(&self, index: usize) -> bool {
        self.bookmarks.contains(&index)
    }

    #[must_use]
    pub fn question_times(&self) -> &BTreeMap<usize, u64> {
        &self.question_times
    }

    #[must_use]
    pub fn question_time(&self, index: usize) -> Option<u64> {
        self.question_times.get(&index).copied()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.len() - self.answered_count()
    }

    #[must_use]
    pub fn bookmarked_count(&self) -> usize {
        self.bookmarks.len()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.len(),
            answered: self.answered_count(),
            bookmarked: self.bookmarked_count(),
            current: self.current,
        }
    }

    #[must_use]
    pub fn question_status(&self, index: usize) -> Option<QuestionStatus> {
        (index < self.len()).then(|| QuestionStatus {
            index,
            answered: self.answers[index].is_some(),
            bookmarked: self.is_bookmarked(index),
            current: index == self.current,
        })
    }

    #[must_use]
    pub fn submission_check(&self) -> SubmissionCheck {
        SubmissionCheck {
            unanswered: self.unanswered_count(),
            bookmarked: self.bookmarked_count(),
        }
    }

    //
    // ─── NAVIGATION ───────────────────────────────────────────────────────────
    //

    /// Move to the next question. Returns `false` (and changes nothing) on the last one.
    pub fn go_to_next(&mut self, now: DateTime<Utc>) -> bool {
        if self.current + 1 >= self.len() {
            return false;
        }
        self.enter(self.current + 1, now);
        true
    }

    /// Move to the previous question. Returns `false` (and changes nothing) on the first one.
    pub fn go_to_previous(&mut self, now: DateTime<Utc>) -> bool {
        if self.current == 0 {
            return false;
        }
        self.enter(self.current - 1, now);
        true
    }

    /// Jump directly to `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` if `index` is not a question of this quiz.
    pub fn jump_to(&mut self, index: usize, now: DateTime<Utc>) -> Result<(), SessionError> {
        if index >= self.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        self.enter(index, now);
        Ok(())
    }

    fn enter(&mut self, index: usize, now: DateTime<Utc>) {
        self.current = index;
        self.entered_at = now;
    }

    //
    // ─── ANSWERS & BOOKMARKS ──────────────────────────────────────────────────
    //

    /// Record `option` for the current question and return the seconds credited to it.
    ///
    /// The credited time replaces any earlier time for this question. The
    /// current question does not change.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidOption` if `option` does not belong to the
    /// current question; state is left untouched.
    pub fn record_answer(&mut self, option: &str, now: DateTime<Utc>) -> Result<u64, SessionError> {
        let index = self.current;
        if !self.questions[index].has_option(option) {
            return Err(SessionError::InvalidOption {
                index,
                option: option.to_owned(),
            });
        }

        let elapsed = elapsed_secs(self.entered_at, now);
        self.answers[index] = Some(option.to_owned());
        self.question_times.insert(index, elapsed);
        Ok(elapsed)
    }

    /// Flip the bookmark on the current question. Returns the new flag.
    pub fn toggle_bookmark(&mut self) -> bool {
        if self.bookmarks.remove(&self.current) {
            false
        } else {
            self.bookmarks.insert(self.current);
            true
        }
    }

    //
    // ─── SUBMISSION ───────────────────────────────────────────────────────────
    //

    /// End the attempt and hand off its read-only snapshot.
    ///
    /// Consumes the state, so no mutation is possible afterwards.
    #[must_use]
    pub fn finish(self, now: DateTime<Utc>) -> QuizSnapshot {
        let total_elapsed_secs = elapsed_secs(self.started_at, now);
        QuizSnapshot::new(
            self.questions,
            self.answers,
            total_elapsed_secs,
            self.question_times,
        )
    }
}
