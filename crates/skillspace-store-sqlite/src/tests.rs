//! Integration tests for `SqliteStore` against an in-memory database, both
//! directly and driven through the `EnrollmentEngine`.

use std::sync::Arc;

use skillspace_core::{
  EngineConfig, EnrollmentEngine, Error as CoreError,
  course::{Course, CourseStatus, Lesson, Module, QuizQuestion},
  engine::NewSubmission,
  enrollment::{Enrollment, EnrollmentStatus, LessonRef},
  identity::Principal,
  store::{CourseReader, EnrollmentStore},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn module(title: &str, lessons: usize, correct: &[u8]) -> Module {
  Module {
    title:      title.into(),
    lessons:    (0..lessons)
      .map(|i| Lesson { title: format!("{title} / {i}"), video_url: None })
      .collect(),
    assignment: None,
    quiz:       correct
      .iter()
      .map(|c| QuizQuestion {
        question:      "Which one?".into(),
        options:       vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_index: *c,
      })
      .collect(),
  }
}

/// Two modules with 3 and 2 lessons; the first carries a three-question quiz.
fn course() -> Course {
  Course {
    course_id: Uuid::new_v4(),
    title:     "Systems Programming".into(),
    status:    CourseStatus::Published,
    modules:   vec![module("Basics", 3, &[1, 2, 0]), module("Traits", 2, &[])],
  }
}

async fn seeded() -> (SqliteStore, Course) {
  let s = store().await;
  let c = course();
  s.put_course(&c).await.unwrap();
  (s, c)
}

fn engine(s: &SqliteStore) -> EnrollmentEngine<SqliteStore, SqliteStore> {
  let shared = Arc::new(s.clone());
  EnrollmentEngine::new(shared.clone(), shared)
}

fn lesson(m: u32, l: u32) -> LessonRef {
  LessonRef { module_index: m, lesson_index: l }
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_course() {
  let (s, c) = seeded().await;
  let fetched = s.get_course(c.course_id).await.unwrap().unwrap();
  assert_eq!(fetched, c);
  assert_eq!(fetched.total_lessons(), 5);
}

#[tokio::test]
async fn get_course_missing_returns_none() {
  let s = store().await;
  assert!(s.get_course(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn put_course_replaces_existing() {
  let (s, mut c) = seeded().await;
  c.status = CourseStatus::Draft;
  c.modules.push(module("Async", 4, &[]));
  s.put_course(&c).await.unwrap();

  let fetched = s.get_course(c.course_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, CourseStatus::Draft);
  assert_eq!(fetched.total_lessons(), 9);
}

#[tokio::test]
async fn put_course_rejects_invalid_quiz() {
  let s = store().await;
  let mut c = course();
  c.modules[0].quiz[0].options.truncate(2);
  let err = s.put_course(&c).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidInput(_))));
  assert!(s.get_course(c.course_id).await.unwrap().is_none());
}

// ─── Enrollment store ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_enrollment() {
  let s = store().await;
  let (student, course_id) = (Uuid::new_v4(), Uuid::new_v4());

  let created = s.create(student, course_id).await.unwrap();
  assert_eq!(created.status, EnrollmentStatus::Enrolled);
  assert_eq!(created.progress, 0);
  assert_eq!(created.version, 0);

  let found = s.find_by_student_and_course(student, course_id).await.unwrap().unwrap();
  assert_eq!(found.enrollment_id, created.enrollment_id);
  assert!(found.completed_lessons.is_empty());
  assert!(found.assignments.is_empty());
  assert!(found.quizzes.is_empty());
}

#[tokio::test]
async fn find_missing_returns_none() {
  let s = store().await;
  let found = s
    .find_by_student_and_course(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn duplicate_create_is_conflict() {
  let s = store().await;
  let (student, course_id) = (Uuid::new_v4(), Uuid::new_v4());
  s.create(student, course_id).await.unwrap();

  let err = s.create(student, course_id).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEnrollment { .. }));
  assert!(matches!(CoreError::from(err), CoreError::Conflict(_)));
  assert_eq!(s.list_by_course(course_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_bumps_version_and_persists_document() {
  let s = store().await;
  let mut e = s.create(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
  e.mark_completed(lesson(0, 1));
  e.progress = 20;

  let saved = s.save(&e).await.unwrap();
  assert_eq!(saved.version, 1);

  let found = s
    .find_by_student_and_course(e.student_id, e.course_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.version, 1);
  assert_eq!(found.progress, 20);
  assert_eq!(found.completed_lessons, vec![lesson(0, 1)]);
  assert_eq!(found.updated_at, saved.updated_at);
}

#[tokio::test]
async fn save_with_stale_version_fails_and_keeps_prior_state() {
  let s = store().await;
  let original = s.create(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

  let mut first = original.clone();
  first.mark_completed(lesson(0, 0));
  s.save(&first).await.unwrap();

  let mut second = original.clone();
  second.mark_completed(lesson(1, 0));
  let err = s.save(&second).await.unwrap_err();
  assert!(matches!(err, Error::StaleWrite { version: 0, .. }));

  let found = s
    .find_by_student_and_course(original.student_id, original.course_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.completed_lessons, vec![lesson(0, 0)]);
  assert_eq!(found.version, 1);
}

#[tokio::test]
async fn save_of_unknown_enrollment_is_not_enrolled() {
  let s = store().await;
  let ghost = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
  let err = s.save(&ghost).await.unwrap_err();
  assert!(matches!(err, Error::EnrollmentNotFound { .. }));
  assert!(matches!(CoreError::from(err), CoreError::NotEnrolled { .. }));
}

#[tokio::test]
async fn list_by_student_and_course() {
  let s = store().await;
  let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
  let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
  s.create(alice, c1).await.unwrap();
  s.create(alice, c2).await.unwrap();
  s.create(bob, c1).await.unwrap();

  let mine = s.list_by_student(alice).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|e| e.student_id == alice));

  let roster = s.list_by_course(c1).await.unwrap();
  assert_eq!(roster.len(), 2);
  assert!(roster.iter().all(|e| e.course_id == c1));
}

// ─── Engine over SQLite ──────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_progress_through_course() {
  let (s, c) = seeded().await;
  let engine = engine(&s);
  let me = Principal::student(Uuid::new_v4());
  engine.enroll(&me, c.course_id).await.unwrap();

  for l in 0..3 {
    engine.complete_lesson(&me, c.course_id, lesson(0, l)).await.unwrap();
  }
  let e = engine.get_enrollment(&me, c.course_id).await.unwrap();
  assert_eq!(e.progress, 60);
  assert_eq!(e.status, EnrollmentStatus::Enrolled);

  engine.complete_lesson(&me, c.course_id, lesson(1, 0)).await.unwrap();
  let e = engine.complete_lesson(&me, c.course_id, lesson(1, 1)).await.unwrap();
  assert_eq!(e.progress, 100);
  assert_eq!(e.status, EnrollmentStatus::Completed);

  // Re-marking after completion changes nothing but the version.
  let again = engine.complete_lesson(&me, c.course_id, lesson(1, 1)).await.unwrap();
  assert_eq!(again.completed_lessons, e.completed_lessons);
  assert_eq!(again.progress, 100);
}

/// Spawn one `complete_lesson` per lesson of a `writers`-lesson module and
/// return the final record.
async fn race_completions(writers: u32, config: EngineConfig) -> Enrollment {
  let s = store().await;
  let mut c = course();
  c.modules = vec![module("Wide", writers as usize, &[])];
  s.put_course(&c).await.unwrap();

  let engine = engine(&s).with_config(config);
  let me = Principal::student(Uuid::new_v4());
  engine.enroll(&me, c.course_id).await.unwrap();

  let handles: Vec<_> = (0..writers)
    .map(|l| {
      let engine = engine.clone();
      let me = me.clone();
      let course_id = c.course_id;
      tokio::spawn(async move { engine.complete_lesson(&me, course_id, lesson(0, l)).await })
    })
    .collect();
  for h in handles {
    h.await.unwrap().unwrap();
  }

  engine.get_enrollment(&me, c.course_id).await.unwrap()
}

#[tokio::test]
async fn concurrent_completions_all_land() {
  let e = race_completions(4, EngineConfig::default()).await;
  assert_eq!(e.completed_lessons.len(), 4);
  assert_eq!(e.progress, 100);
  assert_eq!(e.status, EnrollmentStatus::Completed);
  assert_eq!(e.version, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn more_writers_than_write_attempts_all_land() {
  let e = race_completions(16, EngineConfig::default()).await;
  assert_eq!(e.completed_lessons.len(), 16);
  assert_eq!(e.progress, 100);
  assert_eq!(e.status, EnrollmentStatus::Completed);
  assert_eq!(e.version, 16);
}

#[tokio::test]
async fn writers_queue_without_needing_retries() {
  let e = race_completions(8, EngineConfig { max_write_attempts: 1 }).await;
  assert_eq!(e.completed_lessons.len(), 8);
  assert_eq!(e.progress, 100);
  assert_eq!(e.version, 8);
}

#[tokio::test]
async fn concurrent_enrolls_create_one_record() {
  let (s, c) = seeded().await;
  let engine = engine(&s);
  let me = Principal::student(Uuid::new_v4());

  let (a, b) = tokio::join!(engine.enroll(&me, c.course_id), engine.enroll(&me, c.course_id));
  let (a, b) = (a.unwrap(), b.unwrap());
  assert_eq!(a.enrollment.enrollment_id, b.enrollment.enrollment_id);
  assert!(a.already_enrolled != b.already_enrolled);
  assert_eq!(s.list_by_course(c.course_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn assignments_and_quizzes_persist_in_order() {
  let (s, c) = seeded().await;
  let engine = engine(&s);
  let me = Principal::student(Uuid::new_v4());
  engine.enroll(&me, c.course_id).await.unwrap();

  for link in ["https://drive.example/a", "https://drive.example/b"] {
    engine
      .submit_assignment(&me, c.course_id, NewSubmission {
        module_index: 0,
        link:         Some(link.into()),
        answer_text:  None,
      })
      .await
      .unwrap();
  }

  let outcome = engine
    .submit_quiz(&me, c.course_id, 0, &[Some(1), Some(3), Some(0)])
    .await
    .unwrap();
  assert_eq!((outcome.score, outcome.total), (2, 3));
  assert_eq!(outcome.correct_answers, vec![1, 2, 0]);

  let e = s
    .find_by_student_and_course(me.user_id, c.course_id)
    .await
    .unwrap()
    .unwrap();
  let links: Vec<_> = e.assignments.iter().filter_map(|a| a.link.as_deref()).collect();
  assert_eq!(links, ["https://drive.example/a", "https://drive.example/b"]);
  assert_eq!(e.quizzes.len(), 1);
  assert_eq!(e.quizzes[0].score, 2);
  assert_eq!(e.progress, 0);
  assert_eq!(e.version, 3);
}

#[tokio::test]
async fn quiz_on_module_without_quiz_is_rejected() {
  let (s, c) = seeded().await;
  let engine = engine(&s);
  let me = Principal::student(Uuid::new_v4());
  engine.enroll(&me, c.course_id).await.unwrap();

  let err = engine.submit_quiz(&me, c.course_id, 1, &[Some(0)]).await.unwrap_err();
  assert!(matches!(err, CoreError::ModuleNotFound { module_index: 1, .. }));
}

#[tokio::test]
async fn enroll_in_draft_course_is_not_found() {
  let s = store().await;
  let mut c = course();
  c.status = CourseStatus::Draft;
  s.put_course(&c).await.unwrap();

  let err = engine(&s)
    .enroll(&Principal::student(Uuid::new_v4()), c.course_id)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::CourseNotFound(_)));
}
