use std::time::Duration;

use quiz_core::model::{QuizSnapshot, SessionError, SubmissionCheck};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::controller::{QuizController, QuizView, SubmitReason};
use super::countdown::{CountdownEvent, CountdownGuard};
use crate::error::QuizError;

/// Default time budget for a whole quiz.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 1_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub time_limit_secs: u64,
    pub tick: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            tick: Duration::from_secs(1),
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = secs;
        self
    }
}

/// User intents delivered to a running quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    Next,
    Previous,
    JumpTo(usize),
    Answer(String),
    ToggleBookmark,
    /// `confirmed` is set once the user has accepted the confirmation prompt.
    Submit { confirmed: bool },
}

/// Notifications sent back to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizUpdate {
    View(QuizView),
    Rejected(SessionError),
    ConfirmSubmit(SubmissionCheck),
    Tick { remaining_secs: u64 },
}

/// Final result of a quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub snapshot: QuizSnapshot,
    pub reason: SubmitReason,
}

/// Drives one quiz attempt from a single task.
///
/// The runner owns the controller, so commands and countdown events are
/// applied one at a time. The countdown is stopped before the snapshot is
/// built on every exit path.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizRunner {
    config: QuizConfig,
}

impl QuizRunner {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    /// Run the quiz until it is submitted or the countdown expires.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Abandoned` if the command channel closes before a
    /// submission; the countdown is cancelled in that case too.
    pub async fn run(
        &self,
        mut controller: QuizController,
        mut commands: mpsc::Receiver<QuizCommand>,
        updates: mpsc::UnboundedSender<QuizUpdate>,
    ) -> Result<QuizOutcome, QuizError> {
        let (tick_tx, mut ticks) = mpsc::unbounded_channel();
        let countdown = CountdownGuard::start(self.config.time_limit_secs, self.config.tick, tick_tx);
        notify(&updates, QuizUpdate::View(controller.view()));

        let reason = loop {
            tokio::select! {
                Some(event) = ticks.recv() => match event {
                    CountdownEvent::Tick { remaining_secs } => {
                        notify(&updates, QuizUpdate::Tick { remaining_secs });
                    }
                    CountdownEvent::Expired => break SubmitReason::TimeExpired,
                },
                command = commands.recv() => {
                    let Some(command) = command else {
                        info!("command channel closed, abandoning quiz");
                        return Err(QuizError::Abandoned);
                    };
                    if let Some(reason) = apply(&mut controller, command, &updates) {
                        break reason;
                    }
                }
            }
        };

        countdown.stop().await;
        let snapshot = controller.submit(reason);
        Ok(QuizOutcome { snapshot, reason })
    }
}

fn apply(
    controller: &mut QuizController,
    command: QuizCommand,
    updates: &mpsc::UnboundedSender<QuizUpdate>,
) -> Option<SubmitReason> {
    let result = match command {
        QuizCommand::Next => {
            controller.go_to_next();
            Ok(())
        }
        QuizCommand::Previous => {
            controller.go_to_previous();
            Ok(())
        }
        QuizCommand::JumpTo(index) => controller.jump_to(index),
        QuizCommand::Answer(option) => controller.record_answer(&option).map(|_| ()),
        QuizCommand::ToggleBookmark => {
            controller.toggle_bookmark();
            Ok(())
        }
        QuizCommand::Submit { confirmed } => {
            let check = controller.submission_check();
            if check.needs_confirmation() && !confirmed {
                debug!(
                    unanswered = check.unanswered,
                    bookmarked = check.bookmarked,
                    "submit needs confirmation"
                );
                notify(updates, QuizUpdate::ConfirmSubmit(check));
                return None;
            }
            return Some(SubmitReason::Manual);
        }
    };

    match result {
        Ok(()) => notify(updates, QuizUpdate::View(controller.view())),
        Err(err) => notify(updates, QuizUpdate::Rejected(err)),
    }
    None
}

fn notify(updates: &mpsc::UnboundedSender<QuizUpdate>, update: QuizUpdate) {
    // a closed receiver only means nobody is watching anymore
    let _ = updates.send(update);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question_source::backup_questions;
    use quiz_core::Clock;
    use quiz_core::model::Question;

    fn controller(len: usize) -> QuizController {
        let questions = backup_questions()
            .into_iter()
            .take(len)
            .map(|record| Question::in_record_order(record).unwrap())
            .collect();
        QuizController::new(questions, Clock::default_clock()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_submit_asks_for_confirmation() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (upd_tx, mut upd_rx) = mpsc::unbounded_channel();
        let runner = QuizRunner::new(QuizConfig::default());

        cmd_tx.send(QuizCommand::Submit { confirmed: false }).await.unwrap();
        cmd_tx.send(QuizCommand::Submit { confirmed: true }).await.unwrap();

        let outcome = runner.run(controller(2), cmd_rx, upd_tx).await.unwrap();
        assert_eq!(outcome.reason, SubmitReason::Manual);

        assert!(matches!(upd_rx.recv().await, Some(QuizUpdate::View(_))));
        assert_eq!(
            upd_rx.recv().await,
            Some(QuizUpdate::ConfirmSubmit(SubmissionCheck {
                unanswered: 2,
                bookmarked: 0
            }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_commands_abandon_quiz() {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let (upd_tx, _upd_rx) = mpsc::unbounded_channel();
        drop(cmd_tx);

        let err = QuizRunner::default()
            .run(controller(2), cmd_rx, upd_tx)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::Abandoned));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_commands_are_reported() {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (upd_tx, mut upd_rx) = mpsc::unbounded_channel();

        cmd_tx.send(QuizCommand::JumpTo(10)).await.unwrap();
        cmd_tx.send(QuizCommand::Answer("Nowhere".into())).await.unwrap();
        cmd_tx.send(QuizCommand::Answer("Paris".into())).await.unwrap();
        cmd_tx.send(QuizCommand::Next).await.unwrap();
        cmd_tx.send(QuizCommand::Answer("Central Processing Unit".into())).await.unwrap();
        cmd_tx.send(QuizCommand::Submit { confirmed: false }).await.unwrap();

        let outcome = QuizRunner::default()
            .run(controller(2), cmd_rx, upd_tx)
            .await
            .unwrap();
        assert_eq!(outcome.reason, SubmitReason::Manual);
        assert_eq!(outcome.snapshot.unanswered_count(), 0);

        let mut rejected = Vec::new();
        while let Ok(update) = upd_rx.try_recv() {
            if let QuizUpdate::Rejected(err) = update {
                rejected.push(err);
            }
        }
        assert_eq!(rejected.len(), 2);
        assert!(matches!(rejected[0], SessionError::OutOfRange { index: 10, len: 2 }));
        assert!(matches!(rejected[1], SessionError::InvalidOption { index: 0, .. }));
    }
}
