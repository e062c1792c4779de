use std::collections::BTreeMap;

use crate::model::Question;

/// Percentage (in tenths) at or above which a result counts as a high achievement.
pub const HIGH_ACHIEVEMENT_TENTHS: u32 = 800;

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

/// Read-only hand-off from a finished quiz to the report phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSnapshot {
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    total_elapsed_secs: u64,
    question_times: BTreeMap<usize, u64>,
}

impl QuizSnapshot {
    pub(crate) fn new(
        questions: Vec<Question>,
        answers: Vec<Option<String>>,
        total_elapsed_secs: u64,
        question_times: BTreeMap<usize, u64>,
    ) -> Self {
        Self {
            questions,
            answers,
            total_elapsed_secs,
            question_times,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn total_elapsed_secs(&self) -> u64 {
        self.total_elapsed_secs
    }

    #[must_use]
    pub fn question_times(&self) -> &BTreeMap<usize, u64> {
        &self.question_times
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }
}

/// Number of answers matching their question's correct answer.
#[must_use]
pub fn score(questions: &[Question], answers: &[Option<String>]) -> usize {
    questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| {
            answer
                .as_deref()
                .is_some_and(|answer| question.is_correct(answer))
        })
        .count()
}

/// `100 * score / total` in tenths of a percent, rounded half up.
#[must_use]
pub fn percentage_tenths(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let tenths = (score * 2000 + total) / (2 * total);
    u32::try_from(tenths).unwrap_or(u32::MAX)
}

//
// ─── REPORT ───────────────────────────────────────────────────────────────────
//

/// Outcome of a single question in the detailed review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub index: usize,
    pub category: String,
    pub question: String,
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    /// `None` when the question was never timed or took under a second.
    pub time_secs: Option<u64>,
}

/// Score and timing analytics derived from a finished quiz.
///
/// `fastest_secs` and `slowest_secs` are `None` when no answer was timed; the
/// fastest value ignores zero-second answers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    total: usize,
    score: usize,
    percentage_tenths: u32,
    total_elapsed_secs: u64,
    average_secs: f64,
    fastest_secs: Option<u64>,
    slowest_secs: Option<u64>,
    reviews: Vec<QuestionReview>,
}

impl QuizReport {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_snapshot(snapshot: &QuizSnapshot) -> Self {
        let questions = snapshot.questions();
        let total = questions.len();
        let score = score(questions, snapshot.answers());
        let times = snapshot.question_times();

        let average_secs = if total == 0 {
            0.0
        } else {
            snapshot.total_elapsed_secs() as f64 / total as f64
        };
        let fastest_secs = times.values().copied().filter(|t| *t > 0).min();
        let slowest_secs = times.values().copied().max();

        let reviews = questions
            .iter()
            .zip(snapshot.answers())
            .enumerate()
            .map(|(index, (question, answer))| QuestionReview {
                index,
                category: question.category().to_owned(),
                question: question.text().to_owned(),
                your_answer: answer.clone(),
                correct_answer: question.correct_answer().to_owned(),
                is_correct: answer.as_deref().is_some_and(|a| question.is_correct(a)),
                time_secs: times.get(&index).copied().filter(|t| *t > 0),
            })
            .collect();

        Self {
            total,
            score,
            percentage_tenths: percentage_tenths(score, total),
            total_elapsed_secs: snapshot.total_elapsed_secs(),
            average_secs,
            fastest_secs,
            slowest_secs,
            reviews,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn percentage_tenths(&self) -> u32 {
        self.percentage_tenths
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.percentage_tenths) / 10.0
    }

    /// Percentage with one decimal place, e.g. `"66.7"`.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        format!("{}.{}", self.percentage_tenths / 10, self.percentage_tenths % 10)
    }

    #[must_use]
    pub fn is_high_achievement(&self) -> bool {
        self.percentage_tenths >= HIGH_ACHIEVEMENT_TENTHS
    }

    #[must_use]
    pub fn total_elapsed_secs(&self) -> u64 {
        self.total_elapsed_secs
    }

    /// Total session time divided by the number of questions.
    #[must_use]
    pub fn average_secs(&self) -> f64 {
        self.average_secs
    }

    #[must_use]
    pub fn fastest_secs(&self) -> Option<u64> {
        self.fastest_secs
    }

    #[must_use]
    pub fn slowest_secs(&self) -> Option<u64> {
        self.slowest_secs
    }

    #[must_use]
    pub fn reviews(&self) -> &[QuestionReview] {
        &self.reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuestionKind, QuestionRecord, SessionState};
    use crate::time::fixed_clock;

    fn question(correct: &str, wrong: &[&str]) -> Question {
        Question::in_record_order(QuestionRecord {
            category: "General Knowledge".into(),
            kind: QuestionKind::Multiple,
            difficulty: Difficulty::Medium,
            question: format!("Pick {correct}"),
            correct_answer: correct.into(),
            incorrect_answers: wrong.iter().map(|w| (*w).to_string()).collect(),
        })
        .unwrap()
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question("Paris", &["London", "Berlin", "Madrid"]),
            question("56", &["54", "63", "48"]),
            question("8", &["6", "10", "12"]),
        ]
    }

    #[test]
    fn scores_two_of_three() {
        let mut clock = fixed_clock();
        let mut state = SessionState::new(three_questions(), clock.now()).unwrap();
        for (step, answer) in ["Paris", "54", "8"].into_iter().enumerate() {
            clock.advance_secs(4);
            state.record_answer(answer, clock.now()).unwrap();
            if step < 2 {
                state.go_to_next(clock.now());
            }
        }
        clock.advance_secs(3);

        let report = QuizReport::from_snapshot(&state.finish(clock.now()));
        assert_eq!(report.score(), 2);
        assert_eq!(report.percentage_label(), "66.7");
        assert!(!report.is_high_achievement());
        assert_eq!(report.total_elapsed_secs(), 15);
        assert!((report.average_secs() - 5.0).abs() < f64::EPSILON);
        assert_eq!(report.fastest_secs(), Some(4));
        assert_eq!(report.slowest_secs(), Some(4));

        let second = &report.reviews()[1];
        assert!(!second.is_correct);
        assert_eq!(second.your_answer.as_deref(), Some("54"));
        assert_eq!(second.correct_answer, "56");
    }

    #[test]
    fn no_answers_yields_no_timing_aggregates() {
        let mut clock = fixed_clock();
        let state = SessionState::new(three_questions(), clock.now()).unwrap();
        clock.advance_secs(30);

        let report = QuizReport::from_snapshot(&state.finish(clock.now()));
        assert_eq!(report.score(), 0);
        assert_eq!(report.percentage_label(), "0.0");
        assert_eq!(report.fastest_secs(), None);
        assert_eq!(report.slowest_secs(), None);
        assert!((report.average_secs() - 10.0).abs() < f64::EPSILON);
        assert!(report.reviews().iter().all(|r| r.your_answer.is_none()));
    }

    #[test]
    fn fastest_ignores_zero_second_answers() {
        let mut clock = fixed_clock();
        let mut state = SessionState::new(three_questions(), clock.now()).unwrap();
        state.record_answer("Paris", clock.now()).unwrap();
        state.go_to_next(clock.now());
        clock.advance_secs(9);
        state.record_answer("56", clock.now()).unwrap();

        let report = QuizReport::from_snapshot(&state.finish(clock.now()));
        assert_eq!(report.fastest_secs(), Some(9));
        assert_eq!(report.slowest_secs(), Some(9));
        assert_eq!(report.reviews()[0].time_secs, None);
    }

    #[test]
    fn only_zero_second_answers_have_slowest_but_no_fastest() {
        let clock = fixed_clock();
        let mut state = SessionState::new(three_questions(), clock.now()).unwrap();
        state.record_answer("London", clock.now()).unwrap();

        let report = QuizReport::from_snapshot(&state.finish(clock.now()));
        assert_eq!(report.fastest_secs(), None);
        assert_eq!(report.slowest_secs(), Some(0));
    }

    #[test]
    fn high_achievement_starts_at_eighty_percent() {
        assert_eq!(percentage_tenths(4, 5), 800);
        assert_eq!(percentage_tenths(12, 15), 800);
        assert_eq!(percentage_tenths(11, 15), 733);
        assert_eq!(percentage_tenths(15, 15), 1000);
        assert_eq!(percentage_tenths(1, 3), 333);
    }

    #[test]
    fn score_ignores_answer_order() {
        let questions = three_questions();
        let answers = vec![Some("Paris".to_string()), None, Some("8".to_string())];
        let mut clock = fixed_clock();

        let mut forward = SessionState::new(questions.clone(), clock.now()).unwrap();
        forward.record_answer("Paris", clock.now()).unwrap();
        forward.jump_to(2, clock.now()).unwrap();
        forward.record_answer("8", clock.now()).unwrap();

        clock.advance_secs(1);
        let mut backward = SessionState::new(questions.clone(), clock.now()).unwrap();
        backward.jump_to(2, clock.now()).unwrap();
        backward.record_answer("8", clock.now()).unwrap();
        backward.jump_to(0, clock.now()).unwrap();
        backward.record_answer("Paris", clock.now()).unwrap();

        assert_eq!(forward.answers(), answers.as_slice());
        assert_eq!(backward.answers(), answers.as_slice());
        assert_eq!(score(&questions, forward.answers()), 2);
        assert_eq!(score(&questions, backward.answers()), 2);
    }
}
