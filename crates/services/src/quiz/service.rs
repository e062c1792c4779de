use std::sync::Arc;

use quiz_core::model::ParticipantEmail;
use rand::rng;

use super::controller::QuizController;
use super::prepare::prepare_questions;
use super::runner::{QuizConfig, QuizRunner};
use crate::Clock;
use crate::error::QuizError;
use crate::question_source::{QuestionOrigin, QuestionSource, load_with_fallback};

/// Orchestrates question loading and quiz start.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    config: QuizConfig,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn QuestionSource>) -> Self {
        Self {
            clock,
            source,
            config: QuizConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    /// Load questions and start a quiz for `participant`.
    ///
    /// Source failures never surface here; the backup list is used instead.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the loaded questions cannot form a session.
    pub async fn start_quiz(
        &self,
        participant: ParticipantEmail,
    ) -> Result<(QuizController, QuestionOrigin), QuizError> {
        let (records, origin) = load_with_fallback(self.source.as_ref()).await;
        let questions = prepare_questions(records, &mut rng())?;
        let controller = QuizController::new(questions, self.clock)?.with_participant(participant);
        Ok((controller, origin))
    }

    #[must_use]
    pub fn runner(&self) -> QuizRunner {
        QuizRunner::new(self.config)
    }
}
