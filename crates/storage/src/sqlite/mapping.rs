use screen_core::model::{
    ErrorPattern, ErrorPatternKind, QuestionId, ResponseVerdict, StudentId, TeacherId,
};
use sqlx::Row;

use crate::repository::{SessionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn student_id_from_str(s: &str) -> Result<StudentId, StorageError> {
    s.parse::<StudentId>().map_err(ser)
}

pub(crate) fn teacher_id_from_str(s: &str) -> Result<TeacherId, StorageError> {
    s.parse::<TeacherId>().map_err(ser)
}

/// Converts an `ErrorPatternKind` to its storage representation.
pub(crate) fn kind_to_str(kind: ErrorPatternKind) -> &'static str {
    match kind {
        ErrorPatternKind::Reversal => "reversal",
        ErrorPatternKind::Transposition => "transposition",
        ErrorPatternKind::Omission => "omission",
        ErrorPatternKind::Addition => "addition",
        ErrorPatternKind::Magnitude => "magnitude",
        ErrorPatternKind::Sequence => "sequence",
        ErrorPatternKind::Substitution => "substitution",
    }
}

/// Converts a stored kind back into `ErrorPatternKind`.
/// This must stay consistent with `kind_to_str`.
pub(crate) fn kind_from_str(s: &str) -> Result<ErrorPatternKind, StorageError> {
    match s {
        "reversal" => Ok(ErrorPatternKind::Reversal),
        "transposition" => Ok(ErrorPatternKind::Transposition),
        "omission" => Ok(ErrorPatternKind::Omission),
        "addition" => Ok(ErrorPatternKind::Addition),
        "magnitude" => Ok(ErrorPatternKind::Magnitude),
        "sequence" => Ok(ErrorPatternKind::Sequence),
        "substitution" => Ok(ErrorPatternKind::Substitution),
        other => Err(StorageError::Serialization(format!(
            "invalid error kind: {other}"
        ))),
    }
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StorageError> {
    let student: String = row.try_get("student_id").map_err(ser)?;
    let teacher: String = row.try_get("conducted_by").map_err(ser)?;

    Ok(SessionRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        student_id: student_id_from_str(&student)?,
        conducted_by: teacher_id_from_str(&teacher)?,
        overall_score: row.try_get("overall_score").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_verdict_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ResponseVerdict, StorageError> {
    let question_id = QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?);

    let error_kind: Option<String> = row.try_get("error_kind").map_err(ser)?;
    let error_detail: Option<String> = row.try_get("error_detail").map_err(ser)?;
    let error_pattern = match (error_kind, error_detail) {
        (Some(kind), Some(detail)) => Some(ErrorPattern::new(
            kind_from_str(&kind)?,
            detail,
            question_id.clone(),
        )),
        (None, None) => None,
        _ => {
            return Err(StorageError::Serialization(
                "error kind and detail must be stored together".into(),
            ));
        }
    };

    ResponseVerdict::from_persisted(
        question_id,
        row.try_get("raw_answer").map_err(ser)?,
        row.try_get("response_time_seconds").map_err(ser)?,
        row.try_get("is_correct").map_err(ser)?,
        error_pattern,
    )
    .map_err(ser)
}
