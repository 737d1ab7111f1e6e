pub mod error_pattern;
pub mod ids;
pub mod question;
pub mod session;
pub mod verdict;
pub mod voice;

pub use error_pattern::{ErrorPattern, ErrorPatternKind};
pub use ids::{ParseIdError, QuestionId, StudentId, TeacherId};
pub use question::{
    CorrectAnswer, DEFAULT_TIME_LIMIT_SECONDS, Domain, Question, Stimulus,
};
pub use session::{TestSession, TestSessionError};
pub use verdict::{ResponseVerdict, TIMEOUT_ANSWER, UNTRANSCRIBED_ANSWER, VerdictError};
pub use voice::TranscriptionOutcome;
