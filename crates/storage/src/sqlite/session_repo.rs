use screen_core::model::{ResponseVerdict, StudentId, TeacherId, TestSession};

use super::SqliteRepository;
use super::mapping::{kind_to_str, map_session_row, map_verdict_row};
use crate::repository::{SessionRecord, SessionRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn append_session(&self, session: &TestSession) -> Result<i64, StorageError> {
        let mut tx = self.pool().begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO test_sessions (student_id, conducted_by, overall_score, created_at)
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(session.student_id().to_string())
        .bind(session.conducted_by().to_string())
        .bind(session.overall_score())
        .bind(session.created_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        let session_id = res.last_insert_rowid();

        for (position, verdict) in session.verdicts().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("verdict position overflow".into()))?;

            sqlx::query(
                r"
                    INSERT INTO response_verdicts (
                        session_id, position, question_id, raw_answer,
                        response_time_seconds, is_correct, error_kind, error_detail
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )
            .bind(session_id)
            .bind(position)
            .bind(verdict.question_id().as_str())
            .bind(verdict.raw_answer())
            .bind(verdict.response_time_seconds())
            .bind(verdict.is_correct())
            .bind(verdict.error_pattern().map(|p| kind_to_str(p.kind)))
            .bind(verdict.error_pattern().map(|p| p.detail.as_str()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(session_id)
    }

    async fn sessions_for_student(
        &self,
        student_id: StudentId,
        conducted_by: TeacherId,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, student_id, conducted_by, overall_score, created_at
                FROM test_sessions
                WHERE student_id = ?1 AND conducted_by = ?2
                ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(student_id.to_string())
        .bind(conducted_by.to_string())
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_session_row(&row)?);
        }
        Ok(out)
    }

    async fn verdicts_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<ResponseVerdict>, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM test_sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let rows = sqlx::query(
            r"
                SELECT question_id, raw_answer, response_time_seconds,
                       is_correct, error_kind, error_detail
                FROM response_verdicts
                WHERE session_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool())
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_verdict_row(&row)?);
        }
        Ok(out)
    }
}
