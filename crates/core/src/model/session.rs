use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{StudentId, TeacherId};
use crate::model::verdict::ResponseVerdict;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("session has no verdicts")]
    Empty,

    #[error("overall score must be within 0..=100, got {provided}")]
    InvalidScore { provided: f64 },
}

/// One completed test administration for a student.
///
/// Verdicts are kept in the order they were answered. The overall score is
/// computed by the test orchestrator before the session reaches storage;
/// sessions abandoned before scoring carry no score and are skipped by the
/// progress aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSession {
    student_id: StudentId,
    conducted_by: TeacherId,
    verdicts: Vec<ResponseVerdict>,
    overall_score: Option<f64>,
    created_at: DateTime<Utc>,
}

impl TestSession {
    /// Build a session from the verdicts of one administration.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::Empty` when no verdicts are supplied and
    /// `TestSessionError::InvalidScore` when a score is present but outside
    /// `0..=100` or not finite.
    pub fn new(
        student_id: StudentId,
        conducted_by: TeacherId,
        verdicts: Vec<ResponseVerdict>,
        overall_score: Option<f64>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TestSessionError> {
        if verdicts.is_empty() {
            return Err(TestSessionError::Empty);
        }
        if let Some(score) = overall_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(TestSessionError::InvalidScore { provided: score });
            }
        }

        Ok(Self {
            student_id,
            conducted_by,
            verdicts,
            overall_score,
            created_at,
        })
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn conducted_by(&self) -> TeacherId {
        self.conducted_by
    }

    #[must_use]
    pub fn verdicts(&self) -> &[ResponseVerdict] {
        &self.verdicts
    }

    #[must_use]
    pub fn overall_score(&self) -> Option<f64> {
        self.overall_score
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_correct()).count()
    }
}
