use std::fmt;

use quiz_core::model::{
    ParticipantEmail, Question, QuestionStatus, QuizProgress, QuizSnapshot, SessionError,
    SessionState, SubmissionCheck,
};
use tracing::{debug, info};

use crate::Clock;
use crate::error::QuizError;

/// Why a quiz left the in-progress phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    /// The user submitted (after confirming, when confirmation was needed).
    Manual,
    /// The countdown reached zero.
    TimeExpired,
}

impl SubmitReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitReason::Manual => "manual",
            SubmitReason::TimeExpired => "time_expired",
        }
    }
}

/// Owned view of the active question, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub index: usize,
    pub total: usize,
    pub category: String,
    pub difficulty: String,
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub bookmarked: bool,
    pub progress: QuizProgress,
    pub statuses: Vec<QuestionStatus>,
}

/// Session controller: the only path that mutates a quiz attempt.
///
/// Every operation reads time from the controller clock. `submit` consumes the
/// controller, so nothing can change the attempt after it is handed off.
pub struct QuizController {
    clock: Clock,
    state: SessionState,
    participant: Option<ParticipantEmail>,
}

impl QuizController {
    /// Start an attempt over prepared questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session(SessionError::Empty)` for an empty question list.
    pub fn new(questions: Vec<Question>, clock: Clock) -> Result<Self, QuizError> {
        let state = SessionState::new(questions, clock.now())?;
        info!(questions = state.len(), "quiz session started");
        Ok(Self {
            clock,
            state,
            participant: None,
        })
    }

    #[must_use]
    pub fn with_participant(mut self, participant: ParticipantEmail) -> Self {
        self.participant = Some(participant);
        self
    }

    #[must_use]
    pub fn participant(&self) -> Option<&ParticipantEmail> {
        self.participant.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access to the clock, so fixed clocks can be stepped.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    //
    // ─── OPERATIONS ───────────────────────────────────────────────────────────
    //

    /// Advance one question; a no-op on the last question.
    pub fn go_to_next(&mut self) -> bool {
        self.state.go_to_next(self.clock.now())
    }

    /// Go back one question; a no-op on the first question.
    pub fn go_to_previous(&mut self) -> bool {
        self.state.go_to_previous(self.clock.now())
    }

    /// Jump to a question from the overview panel.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` for an invalid index; state is unchanged.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.state.jump_to(index, self.clock.now()).inspect_err(|err| {
            debug!(error = %err, "jump rejected");
        })
    }

    /// Answer the current question and return the seconds credited to it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidOption` when `option` does not belong to the
    /// current question; state is unchanged.
    pub fn record_answer(&mut self, option: &str) -> Result<u64, SessionError> {
        let index = self.state.current_index();
        let elapsed = self
            .state
            .record_answer(option, self.clock.now())
            .inspect_err(|err| debug!(error = %err, "answer rejected"))?;
        debug!(index, elapsed_secs = elapsed, "answer recorded");
        Ok(elapsed)
    }

    /// Flip the bookmark on the current question and return the new flag.
    pub fn toggle_bookmark(&mut self) -> bool {
        self.state.toggle_bookmark()
    }

    #[must_use]
    pub fn submission_check(&self) -> SubmissionCheck {
        self.state.submission_check()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.state.progress()
    }

    #[must_use]
    pub fn view(&self) -> QuizView {
        let state = &self.state;
        let index = state.current_index();
        let question = state.current_question();
        QuizView {
            index,
            total: state.len(),
            category: question.category().to_owned(),
            difficulty: question.difficulty().to_string(),
            question: question.text().to_owned(),
            options: question.options().to_vec(),
            selected: state.answer(index).map(str::to_owned),
            bookmarked: state.is_bookmarked(index),
            progress: state.progress(),
            statuses: (0..state.len())
                .filter_map(|i| state.question_status(i))
                .collect(),
        }
    }

    /// End the attempt and return its snapshot for the report phase.
    ///
    /// Confirmation for manual submits is the caller's job; see `submission_check`.
    #[must_use]
    pub fn submit(self, reason: SubmitReason) -> QuizSnapshot {
        let check = self.state.submission_check();
        let snapshot = self.state.finish(self.clock.now());
        info!(
            reason = reason.as_str(),
            unanswered = check.unanswered,
            bookmarked = check.bookmarked,
            total_elapsed_secs = snapshot.total_elapsed_secs(),
            "quiz submitted"
        );
        snapshot
    }
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizController")
            .field("questions", &self.state.len())
            .field("current", &self.state.current_index())
            .field("answered", &self.state.answered_count())
            .field("bookmarked", &self.state.bookmarked_count())
            .field("started_at", &self.state.started_at())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question_source::backup_questions;
    use quiz_core::model::QuizReport;
    use quiz_core::time::fixed_clock;

    fn controller(len: usize) -> QuizController {
        let questions = backup_questions()
            .into_iter()
            .take(len)
            .map(|record| Question::in_record_order(record).unwrap())
            .collect();
        QuizController::new(questions, fixed_clock()).unwrap()
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizController::new(Vec::new(), fixed_clock()).unwrap_err();
        assert!(matches!(err, QuizError::Session(SessionError::Empty)));
    }

    #[test]
    fn view_tracks_current_question() {
        let mut quiz = controller(3);
        quiz.record_answer("Paris").unwrap();
        quiz.toggle_bookmark();

        let view = quiz.view();
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 3);
        assert_eq!(view.selected.as_deref(), Some("Paris"));
        assert!(view.bookmarked);
        assert_eq!(view.options.len(), 4);
        assert_eq!(view.statuses.len(), 3);
        assert!(view.statuses[0].current);

        assert!(quiz.go_to_next());
        let view = quiz.view();
        assert_eq!(view.index, 1);
        assert_eq!(view.selected, None);
        assert!(!view.bookmarked);
        assert_eq!(view.progress.answered, 1);
    }

    #[test]
    fn stale_option_is_rejected_without_side_effects() {
        let mut quiz = controller(2);
        quiz.go_to_next();
        let err = quiz.record_answer("Paris").unwrap_err();
        assert!(matches!(err, SessionError::InvalidOption { index: 1, .. }));
        assert_eq!(quiz.progress().answered, 0);
    }

    #[test]
    fn jump_to_out_of_range_keeps_position() {
        let mut quiz = controller(5);
        quiz.jump_to(2).unwrap();
        let err = quiz.jump_to(10).unwrap_err();
        assert_eq!(err, SessionError::OutOfRange { index: 10, len: 5 });
        assert_eq!(quiz.state().current_index(), 2);
    }

    #[test]
    fn re_answer_time_replaces_previous() {
        let mut quiz = controller(3);
        quiz.clock_mut().advance_secs(5);
        quiz.record_answer("London").unwrap();
        quiz.go_to_next();
        quiz.clock_mut().advance_secs(2);
        quiz.go_to_previous();
        quiz.clock_mut().advance_secs(12);
        quiz.record_answer("Paris").unwrap();

        assert_eq!(quiz.state().question_time(0), Some(12));
    }

    #[test]
    fn submit_hands_off_snapshot() {
        let mut quiz = controller(3);
        quiz.clock_mut().advance_secs(10);
        quiz.record_answer("Paris").unwrap();
        quiz.go_to_next();
        quiz.clock_mut().advance_secs(20);
        quiz.record_answer("Central Process Unit").unwrap();
        quiz.toggle_bookmark();

        let check = quiz.submission_check();
        assert_eq!(check.unanswered, 1);
        assert_eq!(check.bookmarked, 1);

        let snapshot = quiz.submit(SubmitReason::Manual);
        assert_eq!(snapshot.total_elapsed_secs(), 30);
        assert_eq!(snapshot.unanswered_count(), 1);

        let report = QuizReport::from_snapshot(&snapshot);
        assert_eq!(report.score(), 1);
        assert_eq!(report.percentage_label(), "33.3");
        assert_eq!(report.fastest_secs(), Some(10));
        assert_eq!(report.slowest_secs(), Some(20));
    }
}
