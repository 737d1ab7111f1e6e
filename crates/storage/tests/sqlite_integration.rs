use chrono::Duration;
use screen_core::classifier;
use screen_core::model::{
    Domain, QuestionId, ResponseVerdict, StudentId, TeacherId, TestSession,
};
use screen_core::time::fixed_now;
use storage::repository::{SessionRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn build_verdict(id: &str, answer: &str, correct_answer: &str) -> ResponseVerdict {
    let question_id = QuestionId::new(id);
    let is_correct = answer == correct_answer;
    let pattern = (!is_correct)
        .then(|| classifier::classify(answer, correct_answer, Domain::Phonological, &question_id));
    ResponseVerdict::from_persisted(question_id, answer.into(), 3.5, is_correct, pattern).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_verdicts_and_patterns() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let session = TestSession::new(
        StudentId::random(),
        TeacherId::random(),
        vec![
            build_verdict("rw1", "was", "was"),
            build_verdict("rw2", "saw", "was"),
            build_verdict("rw3", "eleph", "elephant"),
        ],
        Some(33.3),
        fixed_now(),
    )
    .unwrap();

    let id = repo.append_session(&session).await.unwrap();
    let verdicts = repo.verdicts_for_session(id).await.unwrap();

    assert_eq!(verdicts.len(), 3);
    assert_eq!(verdicts, session.verdicts());
    assert!(verdicts[0].is_correct());
    assert!(verdicts[1].error_pattern().is_some());
}

#[tokio::test]
async fn sqlite_lists_sessions_in_ascending_time_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_ordering?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let student = StudentId::random();
    let teacher = TeacherId::random();
    let now = fixed_now();

    let later = TestSession::new(
        student,
        teacher,
        vec![build_verdict("q1", "was", "was")],
        Some(90.0),
        now + Duration::days(7),
    )
    .unwrap();
    let earlier = TestSession::new(
        student,
        teacher,
        vec![build_verdict("q1", "saw", "was")],
        Some(40.0),
        now,
    )
    .unwrap();
    let unscored = TestSession::new(
        student,
        teacher,
        vec![build_verdict("q1", "was", "was")],
        None,
        now + Duration::days(3),
    )
    .unwrap();

    // Insert newest first to prove the query sorts.
    repo.append_session(&later).await.unwrap();
    repo.append_session(&earlier).await.unwrap();
    repo.append_session(&unscored).await.unwrap();

    // A different teacher's session must not appear in the pair's history.
    let other = TestSession::new(
        student,
        TeacherId::random(),
        vec![build_verdict("q1", "was", "was")],
        Some(10.0),
        now,
    )
    .unwrap();
    repo.append_session(&other).await.unwrap();

    let records = repo.sessions_for_student(student, teacher).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].overall_score, Some(40.0));
    assert_eq!(records[1].overall_score, None);
    assert_eq!(records[2].overall_score, Some(90.0));
}

#[tokio::test]
async fn sqlite_missing_session_is_not_found() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let err = repo.verdicts_for_session(404).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
