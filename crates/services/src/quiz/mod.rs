mod controller;
mod countdown;
mod prepare;
mod runner;
mod service;

// Public API of the quiz subsystem.
pub use controller::{QuizController, QuizView, SubmitReason};
pub use countdown::{
    CountdownEvent, CountdownGuard, WARNING_THRESHOLD_SECS, format_remaining, is_warning,
};
pub use prepare::prepare_questions;
pub use runner::{
    DEFAULT_TIME_LIMIT_SECS, QuizCommand, QuizConfig, QuizOutcome, QuizRunner, QuizUpdate,
};
pub use service::QuizService;
