mod participant;
mod question;
mod report;
mod session;
mod settings;

pub use participant::{ParticipantEmail, ParticipantError};
pub use question::{Difficulty, Question, QuestionError, QuestionKind, QuestionRecord};
pub use report::{
    HIGH_ACHIEVEMENT_TENTHS, QuestionReview, QuizReport, QuizSnapshot, percentage_tenths, score,
};
pub use session::{
    QuestionStatus, QuizProgress, SessionError, SessionState, SubmissionCheck,
};
pub use settings::{DisplaySettings, SettingsError, Theme};
