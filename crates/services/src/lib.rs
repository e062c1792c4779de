#![forbid(unsafe_code)]

pub mod error;
pub mod question_source;
pub mod quiz;
pub mod settings_service;

pub use quiz_core::Clock;

pub use error::{QuestionSourceError, QuizError, SettingsServiceError};
pub use question_source::{
    BackupQuestionSource, OpenTdbSource, QuestionOrigin, QuestionSource, QuestionSourceConfig,
};
pub use quiz::{
    CountdownEvent, CountdownGuard, QuizCommand, QuizConfig, QuizController, QuizOutcome,
    QuizRunner, QuizService, QuizUpdate, QuizView, SubmitReason,
};
pub use settings_service::SettingsService;
