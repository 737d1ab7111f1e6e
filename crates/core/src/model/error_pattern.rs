use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Diagnostic category describing how an incorrect answer deviated from
/// the correct one.
///
/// The variants are ordered here the way the classifier checks them;
/// `Substitution` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPatternKind {
    /// The answer is the character-reversed correct answer ("saw" for "was").
    Reversal,
    /// Same length, at least two characters displaced within the answer.
    Transposition,
    /// Characters dropped from the correct answer.
    Omission,
    /// Extra characters wrapped around the correct answer.
    Addition,
    /// A different numeric value in a number task.
    Magnitude,
    /// Any error on a sequential-logic task.
    Sequence,
    /// None of the above: one answer swapped for another.
    Substitution,
}

/// Classified error pattern for one incorrect response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub kind: ErrorPatternKind,
    /// Human-readable description for the report view.
    pub detail: String,
    /// Back-reference to the question this pattern was observed on.
    pub question_id: QuestionId,
}

impl ErrorPattern {
    #[must_use]
    pub fn new(kind: ErrorPatternKind, detail: impl Into<String>, question_id: QuestionId) -> Self {
        Self {
            kind,
            detail: detail.into(),
            question_id,
        }
    }
}
