//! Turns raw answers into scored verdicts.
//!
//! Two entry points cover the two input channels: `evaluate` for typed or
//! selected answers (exact matching) and `evaluate_voice` for transcribed
//! speech (tolerant matching). Both funnel incorrect answers through the
//! error-pattern classifier.

use thiserror::Error;

use crate::classifier;
use crate::model::{
    Question, ResponseVerdict, TIMEOUT_ANSWER, TranscriptionOutcome, UNTRANSCRIBED_ANSWER,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvaluateError {
    #[error("response time must be non-negative and finite, got {provided}")]
    InvalidResponseTime { provided: f64 },
}

fn check_elapsed(elapsed_seconds: f64) -> Result<(), EvaluateError> {
    if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
        return Err(EvaluateError::InvalidResponseTime {
            provided: elapsed_seconds,
        });
    }
    Ok(())
}

//
// ─── TEXT / CHOICE EVALUATION ──────────────────────────────────────────────────
//

/// Score a typed or selected answer against the question's canonical form.
///
/// `None` represents a timeout: the verdict records the timeout sentinel,
/// is incorrect, and carries no error pattern (there is no answer to
/// classify). Present answers are compared by exact string equality;
/// choice questions present exact option strings, so no normalization is
/// applied.
///
/// # Errors
///
/// Returns `EvaluateError::InvalidResponseTime` for a negative or
/// non-finite elapsed time.
pub fn evaluate(
    answer: Option<&str>,
    question: &Question,
    elapsed_seconds: f64,
) -> Result<ResponseVerdict, EvaluateError> {
    check_elapsed(elapsed_seconds)?;
    let correct = question.correct_answer().canonical();

    match answer {
        None => Ok(ResponseVerdict::new(
            question.id().clone(),
            TIMEOUT_ANSWER.to_owned(),
            elapsed_seconds,
            false,
            None,
        )),
        Some(answer) => {
            let is_correct = answer == correct;
            let error_pattern = (!is_correct).then(|| {
                classifier::classify(answer, &correct, question.domain(), question.id())
            });

            Ok(ResponseVerdict::new(
                question.id().clone(),
                answer.to_owned(),
                elapsed_seconds,
                is_correct,
                error_pattern,
            ))
        }
    }
}

//
// ─── VOICE EVALUATION ──────────────────────────────────────────────────────────
//

/// Score a spoken answer using transcription-tolerant matching.
///
/// Transcribed text is compared in normalized form (lower-cased, trimmed,
/// inner whitespace collapsed); equality or either side containing the
/// other counts as correct, which absorbs transcription padding and
/// truncation. An `Unavailable` outcome is recorded under the
/// untranscribed sentinel and is always incorrect, so the attempt stays
/// scoreable either way.
///
/// # Errors
///
/// Returns `EvaluateError::InvalidResponseTime` for a negative or
/// non-finite elapsed time.
pub fn evaluate_voice(
    outcome: &TranscriptionOutcome,
    question: &Question,
    elapsed_seconds: f64,
) -> Result<ResponseVerdict, EvaluateError> {
    check_elapsed(elapsed_seconds)?;
    let correct = question.correct_answer().canonical();
    let correct_norm = normalize_speech(&correct);

    match outcome {
        TranscriptionOutcome::Transcribed(text) => {
            let user_norm = normalize_speech(text);
            let is_correct = user_norm == correct_norm
                || user_norm.contains(&correct_norm)
                || correct_norm.contains(&user_norm);
            let error_pattern = (!is_correct).then(|| {
                classifier::classify(&user_norm, &correct_norm, question.domain(), question.id())
            });

            Ok(ResponseVerdict::new(
                question.id().clone(),
                text.clone(),
                elapsed_seconds,
                is_correct,
                error_pattern,
            ))
        }
        TranscriptionOutcome::Unavailable => {
            let user_norm = normalize_speech(UNTRANSCRIBED_ANSWER);
            let error_pattern = classifier::classify(
                &user_norm,
                &correct_norm,
                question.domain(),
                question.id(),
            );

            Ok(ResponseVerdict::new(
                question.id().clone(),
                UNTRANSCRIBED_ANSWER.to_owned(),
                elapsed_seconds,
                false,
                Some(error_pattern),
            ))
        }
    }
}

/// Collapse a transcript to its whitespace-normalized, lower-cased form.
#[must_use]
pub fn normalize_speech(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectAnswer, Domain, ErrorPatternKind, QuestionId, Stimulus};

    fn build_question(correct: CorrectAnswer, domain: Domain) -> Question {
        Question::new(
            QuestionId::new("q1"),
            Stimulus::Text("was".into()),
            "Read this word aloud",
            correct,
            domain,
        )
    }

    #[test]
    fn timeout_is_incorrect_with_no_pattern() {
        let q = build_question("was".into(), Domain::Phonological);
        let verdict = evaluate(None, &q, 30.0).unwrap();

        assert!(!verdict.is_correct());
        assert!(verdict.is_timeout());
        assert_eq!(verdict.raw_answer(), TIMEOUT_ANSWER);
        assert!(verdict.error_pattern().is_none());
        assert_eq!(verdict.response_time_seconds(), 30.0);
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let q = build_question("was".into(), Domain::Phonological);

        let correct = evaluate(Some("was"), &q, 1.5).unwrap();
        assert!(correct.is_correct());
        assert!(correct.error_pattern().is_none());

        let wrong_case = evaluate(Some("Was"), &q, 1.5).unwrap();
        assert!(!wrong_case.is_correct());
        assert!(wrong_case.error_pattern().is_some());
    }

    #[test]
    fn incorrect_answer_is_classified() {
        let q = build_question("was".into(), Domain::Phonological);
        let verdict = evaluate(Some("saw"), &q, 2.0).unwrap();

        assert!(!verdict.is_correct());
        let pattern = verdict.error_pattern().unwrap();
        assert_eq!(pattern.kind, ErrorPatternKind::Reversal);
        assert_eq!(pattern.question_id, QuestionId::new("q1"));
    }

    #[test]
    fn token_answer_compares_against_joined_form() {
        let q = build_question(
            CorrectAnswer::Tokens(vec!["red".into(), "blue".into()]),
            Domain::WorkingMemory,
        );
        let verdict = evaluate(Some("red blue"), &q, 3.0).unwrap();
        assert!(verdict.is_correct());
    }

    #[test]
    fn negative_elapsed_time_errors() {
        let q = build_question("was".into(), Domain::Phonological);
        let err = evaluate(Some("was"), &q, -1.0).unwrap_err();
        assert!(matches!(err, EvaluateError::InvalidResponseTime { .. }));
    }

    #[test]
    fn voice_match_tolerates_case_and_whitespace() {
        let q = build_question("was".into(), Domain::Phonological);
        let outcome = TranscriptionOutcome::Transcribed("  Was ".into());
        let verdict = evaluate_voice(&outcome, &q, 4.0).unwrap();
        assert!(verdict.is_correct());
        assert_eq!(verdict.raw_answer(), "  Was ");
    }

    #[test]
    fn voice_match_tolerates_transcription_padding() {
        let q = build_question("elephant".into(), Domain::Phonological);
        let outcome = TranscriptionOutcome::Transcribed("the elephant please".into());
        let verdict = evaluate_voice(&outcome, &q, 4.0).unwrap();
        assert!(verdict.is_correct());
    }

    #[test]
    fn voice_mismatch_is_classified_on_normalized_forms() {
        let q = build_question("was".into(), Domain::Phonological);
        let outcome = TranscriptionOutcome::Transcribed("SAW".into());
        let verdict = evaluate_voice(&outcome, &q, 4.0).unwrap();

        assert!(!verdict.is_correct());
        assert_eq!(
            verdict.error_pattern().unwrap().kind,
            ErrorPatternKind::Reversal
        );
    }

    #[test]
    fn unavailable_transcript_scores_as_untranscribed_attempt() {
        let q = build_question("was".into(), Domain::Phonological);
        let verdict = evaluate_voice(&TranscriptionOutcome::Unavailable, &q, 10.0).unwrap();

        assert!(!verdict.is_correct());
        assert_eq!(verdict.raw_answer(), UNTRANSCRIBED_ANSWER);
        assert_eq!(
            verdict.error_pattern().unwrap().kind,
            ErrorPatternKind::Substitution
        );
    }

    #[test]
    fn normalize_collapses_inner_whitespace() {
        assert_eq!(normalize_speech("  Red   BLUE \t green "), "red blue green");
    }
}
