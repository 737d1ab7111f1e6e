use async_trait::async_trait;
use chrono::{DateTime, Utc};
use screen_core::model::{ResponseVerdict, StudentId, TeacherId, TestSession};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for one test session, without its verdicts.
///
/// This mirrors the domain `TestSession` header so repositories can list
/// histories cheaply; verdicts are fetched separately when a report needs
/// them.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Option<i64>,
    pub student_id: StudentId,
    pub conducted_by: TeacherId,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &TestSession) -> Self {
        Self {
            id: None,
            student_id: session.student_id(),
            conducted_by: session.conducted_by(),
            overall_score: session.overall_score(),
            created_at: session.created_at(),
        }
    }
}

/// Repository contract for persisted test sessions.
///
/// The engine only reads through this interface; writing a finalized
/// session is the test orchestrator's job.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a finalized session together with its ordered verdicts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn append_session(&self, session: &TestSession) -> Result<i64, StorageError>;

    /// All sessions for a student/teacher pair, ascending by creation time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or mapping failures.
    async fn sessions_for_student(
        &self,
        student_id: StudentId,
        conducted_by: TeacherId,
    ) -> Result<Vec<SessionRecord>, StorageError>;

    /// Ordered verdicts for one persisted session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown session id.
    async fn verdicts_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<ResponseVerdict>, StorageError>;
}

struct StoredSession {
    record: SessionRecord,
    verdicts: Vec<ResponseVerdict>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<Vec<StoredSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn append_session(&self, session: &TestSession) -> Result<i64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("session id overflow".into()))?
            + 1;
        let mut record = SessionRecord::from_session(session);
        record.id = Some(id);
        guard.push(StoredSession {
            record,
            verdicts: session.verdicts().to_vec(),
        });
        Ok(id)
    }

    async fn sessions_for_student(
        &self,
        student_id: StudentId,
        conducted_by: TeacherId,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records: Vec<SessionRecord> = guard
            .iter()
            .filter(|s| {
                s.record.student_id == student_id && s.record.conducted_by == conducted_by
            })
            .map(|s| s.record.clone())
            .collect();
        records.sort_by_key(|r| (r.created_at, r.id));
        Ok(records)
    }

    async fn verdicts_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<ResponseVerdict>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        guard
            .iter()
            .find(|s| s.record.id == Some(session_id))
            .map(|s| s.verdicts.clone())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates session storage behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo);
        Self { sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use screen_core::model::{QuestionId, TestSession};
    use screen_core::time::fixed_now;

    fn build_verdict(id: &str, correct: bool) -> ResponseVerdict {
        ResponseVerdict::from_persisted(QuestionId::new(id), "34".into(), 2.5, correct, None)
            .unwrap()
    }

    fn build_session(
        student: StudentId,
        teacher: TeacherId,
        score: Option<f64>,
        created_at: chrono::DateTime<Utc>,
    ) -> TestSession {
        TestSession::new(
            student,
            teacher,
            vec![build_verdict("q1", true), build_verdict("q2", false)],
            score,
            created_at,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sessions_list_in_ascending_time_order() {
        let repo = InMemoryRepository::new();
        let student = StudentId::random();
        let teacher = TeacherId::random();
        let now = fixed_now();

        // Insert newest first to prove the query sorts.
        repo.append_session(&build_session(
            student,
            teacher,
            Some(90.0),
            now + Duration::days(2),
        ))
        .await
        .unwrap();
        repo.append_session(&build_session(student, teacher, Some(60.0), now))
            .await
            .unwrap();
        repo.append_session(&build_session(
            StudentId::random(),
            teacher,
            Some(10.0),
            now,
        ))
        .await
        .unwrap();

        let records = repo.sessions_for_student(student, teacher).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].overall_score, Some(60.0));
        assert_eq!(records[1].overall_score, Some(90.0));
    }

    #[tokio::test]
    async fn verdicts_round_trip_in_order() {
        let repo = InMemoryRepository::new();
        let session = build_session(
            StudentId::random(),
            TeacherId::random(),
            Some(50.0),
            fixed_now(),
        );

        let id = repo.append_session(&session).await.unwrap();
        let verdicts = repo.verdicts_for_session(id).await.unwrap();
        assert_eq!(verdicts, session.verdicts());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.verdicts_for_session(99).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
