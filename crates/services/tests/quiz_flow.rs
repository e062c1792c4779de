use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{ParticipantEmail, Question, QuestionRecord, QuizReport};
use quiz_core::time::fixed_clock;
use services::question_source::backup_questions;
use services::{
    BackupQuestionSource, QuestionOrigin, QuestionSource, QuestionSourceError, QuizCommand,
    QuizConfig, QuizController, QuizRunner, QuizService, QuizUpdate, SubmitReason,
};
use tokio::sync::mpsc;

struct DownSource;

#[async_trait]
impl QuestionSource for DownSource {
    async fn fetch(&self) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
        Err(QuestionSourceError::ResponseCode(2))
    }
}

fn participant() -> ParticipantEmail {
    ParticipantEmail::parse("quiz.taker@example.com").unwrap()
}

#[tokio::test]
async fn failed_fetch_still_starts_fifteen_question_quiz() {
    let service = QuizService::new(fixed_clock(), Arc::new(DownSource));
    let (controller, origin) = service.start_quiz(participant()).await.unwrap();

    assert_eq!(origin, QuestionOrigin::Backup);
    assert_eq!(controller.state().len(), 15);
    assert_eq!(
        controller.participant().map(ParticipantEmail::as_str),
        Some("quiz.taker@example.com")
    );
    for question in controller.state().questions() {
        assert!(question.has_option(question.correct_answer()));
    }
}

#[tokio::test]
async fn full_manual_run_scores_every_question() {
    let service = QuizService::new(fixed_clock(), Arc::new(BackupQuestionSource));
    let (mut controller, origin) = service.start_quiz(participant()).await.unwrap();
    assert_eq!(origin, QuestionOrigin::Remote);

    let total = controller.state().len();
    for index in 0..total {
        let correct = controller.state().questions()[index].correct_answer().to_owned();
        controller.clock_mut().advance_secs(3);
        controller.record_answer(&correct).unwrap();
        controller.go_to_next();
    }
    assert_eq!(controller.state().current_index(), total - 1);
    assert!(!controller.submission_check().needs_confirmation());

    let snapshot = controller.submit(SubmitReason::Manual);
    let report = QuizReport::from_snapshot(&snapshot);
    assert_eq!(report.score(), total);
    assert_eq!(report.percentage_label(), "100.0");
    assert!(report.is_high_achievement());
    assert_eq!(report.total_elapsed_secs(), 45);
    assert_eq!(report.fastest_secs(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_submits_partial_answers_without_confirmation() {
    let questions = backup_questions()
        .into_iter()
        .take(3)
        .map(|record| Question::in_record_order(record).unwrap())
        .collect();
    let controller = QuizController::new(questions, services::Clock::default_clock()).unwrap();

    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (upd_tx, mut upd_rx) = mpsc::unbounded_channel();
    cmd_tx.send(QuizCommand::Answer("Paris".into())).await.unwrap();
    cmd_tx.send(QuizCommand::ToggleBookmark).await.unwrap();

    let runner = QuizRunner::new(QuizConfig::default().with_time_limit_secs(5));
    let outcome = runner.run(controller, cmd_rx, upd_tx).await.unwrap();

    assert_eq!(outcome.reason, SubmitReason::TimeExpired);
    assert_eq!(
        outcome.snapshot.answers(),
        &[Some("Paris".to_string()), None, None]
    );
    assert_eq!(outcome.snapshot.unanswered_count(), 2);

    let mut ticks = Vec::new();
    while let Ok(update) = upd_rx.try_recv() {
        match update {
            QuizUpdate::ConfirmSubmit(_) => panic!("expiry must not ask for confirmation"),
            QuizUpdate::Tick { remaining_secs } => ticks.push(remaining_secs),
            _ => {}
        }
    }
    assert_eq!(ticks, vec![4, 3, 2, 1]);

    // the sender is still alive: the quiz ended because of the countdown alone
    drop(cmd_tx);
}
