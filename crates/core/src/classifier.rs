//! First-match-wins classification of incorrect answers.
//!
//! The cascade encodes a diagnostic priority: structural errors (reversal,
//! transposition) are checked before subset/superset errors (omission,
//! addition), domain-specific errors come next, and substitution is the
//! catch-all. Reordering the rules changes which diagnosis a malformed
//! answer receives, so they live in one ordered table.

use crate::model::{Domain, ErrorPattern, ErrorPatternKind, QuestionId};

//
// ─── RULE TABLE ────────────────────────────────────────────────────────────────
//

struct ClassifyInput<'a> {
    user: &'a str,
    correct: &'a str,
    domain: Domain,
    question_id: &'a QuestionId,
}

/// One rule in the cascade: returns a pattern when it matches, `None` to
/// pass the answer on to the next rule.
type Rule = fn(&ClassifyInput<'_>) -> Option<ErrorPattern>;

const RULES: &[Rule] = &[
    reversal,
    transposition,
    omission,
    addition,
    magnitude,
    sequence,
];

/// Classify how an incorrect `user` answer deviates from `correct`.
///
/// Callers invoke this only for answers already known to be incorrect, so
/// the cascade always produces a pattern; substitution is the fallback when
/// no earlier rule matches.
#[must_use]
pub fn classify(
    user: &str,
    correct: &str,
    domain: Domain,
    question_id: &QuestionId,
) -> ErrorPattern {
    let input = ClassifyInput {
        user,
        correct,
        domain,
        question_id,
    };

    RULES
        .iter()
        .find_map(|rule| rule(&input))
        .unwrap_or_else(|| substitution(&input))
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// The answer reads the correct answer backwards ("saw" for "was",
/// "43" for "34").
fn reversal(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    let reversed: String = input.user.chars().rev().collect();
    (reversed == input.correct).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Reversal,
            format!("Reversed {} as {}", input.correct, input.user),
            input.question_id.clone(),
        )
    })
}

/// Same length, with at least two positions holding a character that is
/// wrong there but present elsewhere in the correct answer.
///
/// This is a per-position membership check, not a full anagram check; the
/// threshold is deliberately loose.
fn transposition(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    let user: Vec<char> = input.user.chars().collect();
    let correct: Vec<char> = input.correct.chars().collect();
    if user.len() != correct.len() {
        return None;
    }

    let displaced = user
        .iter()
        .zip(correct.iter())
        .filter(|(u, c)| u != c && input.correct.contains(**u))
        .count();

    (displaced >= 2).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Transposition,
            format!("Transposed letters in {}", input.correct),
            input.question_id.clone(),
        )
    })
}

/// Strictly shorter and a contiguous substring of the correct answer.
fn omission(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    let shorter = input.user.chars().count() < input.correct.chars().count();
    (shorter && input.correct.contains(input.user)).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Omission,
            format!("Omitted characters from {}", input.correct),
            input.question_id.clone(),
        )
    })
}

/// Strictly longer and containing the correct answer as a contiguous
/// substring.
fn addition(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    let longer = input.user.chars().count() > input.correct.chars().count();
    (longer && input.user.contains(input.correct)).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Addition,
            format!("Added extra characters to {}", input.correct),
            input.question_id.clone(),
        )
    })
}

/// Numeric domains only: both answers parse as numbers and the values
/// differ. Non-parsing strings fall through to the next rule.
fn magnitude(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    if !input.domain.is_numeric() {
        return None;
    }
    let user = parse_numeric(input.user)?;
    let correct = parse_numeric(input.correct)?;

    (user != correct).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Magnitude,
            format!(
                "Magnitude error: chose {} instead of {}",
                input.user, input.correct
            ),
            input.question_id.clone(),
        )
    })
}

/// Sequential-logic catch-all: any wrong answer in the domain is a
/// sequence error.
fn sequence(input: &ClassifyInput<'_>) -> Option<ErrorPattern> {
    (input.domain == Domain::SequentialLogic).then(|| {
        ErrorPattern::new(
            ErrorPatternKind::Sequence,
            format!("Sequence pattern error on {}", input.question_id),
            input.question_id.clone(),
        )
    })
}

/// Final fallback when no earlier rule matched.
fn substitution(input: &ClassifyInput<'_>) -> ErrorPattern {
    ErrorPattern::new(
        ErrorPatternKind::Substitution,
        format!("Substituted {} with {}", input.correct, input.user),
        input.question_id.clone(),
    )
}

/// Strip everything but digits, sign, and decimal point before parsing.
fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
