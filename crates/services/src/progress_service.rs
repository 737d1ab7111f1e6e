//! Read-side progress queries over persisted session history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use screen_core::model::{StudentId, TeacherId};
use screen_core::progress::{ProgressStats, aggregate};
use storage::repository::SessionRepository;

use crate::error::ProgressError;

/// One scored session in a student's history.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePoint {
    pub recorded_at: DateTime<Utc>,
    pub score: f64,
}

/// Answers progress queries for a student/teacher pair.
///
/// Purely a reader: statistics are recomputed from the stored history on
/// every call, never cached.
#[derive(Clone)]
pub struct ProgressService {
    sessions: Arc<dyn SessionRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Scored history ascending by session time; unscored sessions are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` for repository failures.
    pub async fn score_history(
        &self,
        student_id: StudentId,
        conducted_by: TeacherId,
    ) -> Result<Vec<ScorePoint>, ProgressError> {
        let records = self
            .sessions
            .sessions_for_student(student_id, conducted_by)
            .await?;
        let points: Vec<ScorePoint> = records
            .into_iter()
            .filter_map(|record| {
                record.overall_score.map(|score| ScorePoint {
                    recorded_at: record.created_at,
                    score,
                })
            })
            .collect();

        debug!(%student_id, count = points.len(), "loaded score history");
        Ok(points)
    }

    /// Descriptive statistics and trend over the scored history.
    ///
    /// Returns `Ok(None)` when the student has no scored sessions yet.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` for repository failures.
    pub async fn progress_stats(
        &self,
        student_id: StudentId,
        conducted_by: TeacherId,
    ) -> Result<Option<ProgressStats>, ProgressError> {
        let history = self.score_history(student_id, conducted_by).await?;
        let scores: Vec<f64> = history.iter().map(|point| point.score).collect();
        Ok(aggregate(&scores))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use screen_core::model::{QuestionId, ResponseVerdict, TestSession};
    use screen_core::progress::Trend;
    use screen_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn build_session(
        student: StudentId,
        teacher: TeacherId,
        score: Option<f64>,
        created_at: DateTime<Utc>,
    ) -> TestSession {
        let verdict = ResponseVerdict::from_persisted(
            QuestionId::new("q1"),
            "34".into(),
            2.0,
            true,
            None,
        )
        .unwrap();
        TestSession::new(student, teacher, vec![verdict], score, created_at).unwrap()
    }

    async fn seed(repo: &InMemoryRepository, student: StudentId, teacher: TeacherId) {
        let now = fixed_now();
        for (days, score) in [(0, Some(60.0)), (7, Some(75.0)), (10, None), (14, Some(90.0))] {
            repo.append_session(&build_session(
                student,
                teacher,
                score,
                now + Duration::days(days),
            ))
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn history_skips_unscored_sessions() {
        let repo = InMemoryRepository::new();
        let student = StudentId::random();
        let teacher = TeacherId::random();
        seed(&repo, student, teacher).await;

        let service = ProgressService::new(Arc::new(repo));
        let history = service.score_history(student, teacher).await.unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].score, 60.0);
        assert_eq!(history[2].score, 90.0);
    }

    #[tokio::test]
    async fn stats_follow_the_scored_series() {
        let repo = InMemoryRepository::new();
        let student = StudentId::random();
        let teacher = TeacherId::random();
        seed(&repo, student, teacher).await;

        let service = ProgressService::new(Arc::new(repo));
        let stats = service
            .progress_stats(student, teacher)
            .await
            .unwrap()
            .expect("scored sessions exist");

        assert_eq!(stats.average, 75.0);
        assert_eq!(stats.high, 90.0);
        assert_eq!(stats.low, 60.0);
        assert_eq!(stats.trend, Trend::Improving);
    }

    #[tokio::test]
    async fn empty_history_yields_no_stats() {
        let repo = InMemoryRepository::new();
        let service = ProgressService::new(Arc::new(repo));

        let stats = service
            .progress_stats(StudentId::random(), TeacherId::random())
            .await
            .unwrap();
        assert_eq!(stats, None);
    }
}
