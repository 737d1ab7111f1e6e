use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::error_pattern::ErrorPattern;
use crate::model::ids::QuestionId;

/// Raw-answer sentinel recorded when the countdown ran out with nothing
/// to submit.
pub const TIMEOUT_ANSWER: &str = "timeout";

/// Raw-answer sentinel recorded when an attempt was captured but the
/// transcription collaborator produced nothing usable.
pub const UNTRANSCRIBED_ANSWER: &str = "Audio recorded but not transcribed";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised when rehydrating a verdict from storage.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum VerdictError {
    #[error("response time must be non-negative and finite, got {provided}")]
    InvalidResponseTime { provided: f64 },

    #[error("error pattern attached to a correct answer")]
    PatternOnCorrect,
}

//
// ─── RESPONSE VERDICT ──────────────────────────────────────────────────────────
//

/// Scored outcome of one answered question.
///
/// Created exactly once per question by the response evaluator and never
/// mutated afterwards; the orchestrator owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseVerdict {
    question_id: QuestionId,
    raw_answer: String,
    response_time_seconds: f64,
    is_correct: bool,
    error_pattern: Option<ErrorPattern>,
}

impl ResponseVerdict {
    pub(crate) fn new(
        question_id: QuestionId,
        raw_answer: String,
        response_time_seconds: f64,
        is_correct: bool,
        error_pattern: Option<ErrorPattern>,
    ) -> Self {
        Self {
            question_id,
            raw_answer,
            response_time_seconds,
            is_correct,
            error_pattern,
        }
    }

    /// Rehydrate a verdict from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `VerdictError::InvalidResponseTime` for a negative or
    /// non-finite response time, and `VerdictError::PatternOnCorrect` when
    /// a correct verdict carries an error pattern.
    pub fn from_persisted(
        question_id: QuestionId,
        raw_answer: String,
        response_time_seconds: f64,
        is_correct: bool,
        error_pattern: Option<ErrorPattern>,
    ) -> Result<Self, VerdictError> {
        if !response_time_seconds.is_finite() || response_time_seconds < 0.0 {
            return Err(VerdictError::InvalidResponseTime {
                provided: response_time_seconds,
            });
        }
        if is_correct && error_pattern.is_some() {
            return Err(VerdictError::PatternOnCorrect);
        }

        Ok(Self::new(
            question_id,
            raw_answer,
            response_time_seconds,
            is_correct,
            error_pattern,
        ))
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn raw_answer(&self) -> &str {
        &self.raw_answer
    }

    #[must_use]
    pub fn response_time_seconds(&self) -> f64 {
        self.response_time_seconds
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn error_pattern(&self) -> Option<&ErrorPattern> {
        self.error_pattern.as_ref()
    }

    /// True when this verdict records a timeout rather than an answer.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.raw_answer == TIMEOUT_ANSWER
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error_pattern::ErrorPatternKind;

    #[test]
    fn rehydration_rejects_negative_time() {
        let err = ResponseVerdict::from_persisted(
            QuestionId::new("q1"),
            "34".into(),
            -0.5,
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, VerdictError::InvalidResponseTime { .. }));
    }

    #[test]
    fn rehydration_rejects_pattern_on_correct() {
        let pattern = ErrorPattern::new(
            ErrorPatternKind::Substitution,
            "Substituted 34 with 43",
            QuestionId::new("q1"),
        );
        let err = ResponseVerdict::from_persisted(
            QuestionId::new("q1"),
            "34".into(),
            1.0,
            true,
            Some(pattern),
        )
        .unwrap_err();
        assert!(matches!(err, VerdictError::PatternOnCorrect));
    }

    #[test]
    fn timeout_sentinel_is_detected() {
        let verdict = ResponseVerdict::from_persisted(
            QuestionId::new("q1"),
            TIMEOUT_ANSWER.into(),
            30.0,
            false,
            None,
        )
        .unwrap();
        assert!(verdict.is_timeout());
        assert!(!verdict.is_correct());
    }
}
