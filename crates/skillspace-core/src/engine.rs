//! [`EnrollmentEngine`]: the operations a transport layer calls.
//!
//! Every mutating operation is a read-modify-write of one [`Enrollment`]:
//! load it, apply the change to the snapshot, then save with the version that
//! was read. Writers to one enrollment queue on a per-pair lock, so within
//! this process they never race. A save that still loses to an outside
//! writer repeats the whole cycle against the fresh record.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  course::Course,
  enrollment::{
    AssignmentSubmission, Enrollment, LessonRef, QuizAttempt, SubmissionStatus,
  },
  grading,
  identity::Principal,
  locks::EnrollmentLocks,
  progress,
  store::{CourseReader, EnrollmentStore},
};

/// Write attempts per operation when the default configuration is used.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
  /// How many load-apply-save cycles an operation may run before a lost
  /// compare-and-swap is reported to the caller. Only writers outside this
  /// engine can cause a loss. Values below 1 act as 1.
  pub max_write_attempts: usize,
}

impl Default for EngineConfig {
  fn default() -> Self { Self { max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS } }
}

// ─── Operation inputs and results ────────────────────────────────────────────

/// Result of [`EnrollmentEngine::enroll`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrolled {
  pub enrollment:       Enrollment,
  /// `true` when the record already existed and was returned unchanged.
  pub already_enrolled: bool,
}

/// An assignment deliverable as submitted by a student.
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
  pub module_index: u32,
  pub link:         Option<String>,
  pub answer_text:  Option<String>,
}

/// Result of [`EnrollmentEngine::submit_assignment`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReceipt {
  pub enrollment: Enrollment,
  pub submission: AssignmentSubmission,
}

/// Result of [`EnrollmentEngine::submit_quiz`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
  pub score:           u32,
  pub total:           u32,
  pub correct_answers: Vec<u8>,
  pub enrollment:      Enrollment,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct EnrollmentEngine<S, C> {
  store:   Arc<S>,
  courses: Arc<C>,
  locks:   Arc<EnrollmentLocks>,
  config:  EngineConfig,
}

impl<S, C> Clone for EnrollmentEngine<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      courses: Arc::clone(&self.courses),
      locks:   Arc::clone(&self.locks),
      config:  self.config,
    }
  }
}

impl<S, C> EnrollmentEngine<S, C>
where
  S: EnrollmentStore,
  C: CourseReader,
{
  pub fn new(store: Arc<S>, courses: Arc<C>) -> Self {
    Self {
      store,
      courses,
      locks: Arc::default(),
      config: EngineConfig::default(),
    }
  }

  pub fn with_config(mut self, config: EngineConfig) -> Self {
    self.config = config;
    self
  }

  // ── Enrollment ────────────────────────────────────────────────────────────

  /// Enroll the principal in a published course.
  ///
  /// Enrolling twice is not an error: the existing record comes back with
  /// `already_enrolled = true`.
  pub async fn enroll(&self, principal: &Principal, course_id: Uuid) -> Result<Enrolled> {
    let course = self.course(course_id).await?;
    if !course.is_published() {
      return Err(Error::CourseNotFound(course_id));
    }

    let student_id = principal.user_id;
    if let Some(existing) = self.find(student_id, course_id).await? {
      return Ok(Enrolled { enrollment: existing, already_enrolled: true });
    }

    match self.store.create(student_id, course_id).await.map_err(Into::<Error>::into) {
      Ok(enrollment) => {
        info!(%student_id, %course_id, "student enrolled");
        Ok(Enrolled { enrollment, already_enrolled: false })
      }
      // Lost a race with a concurrent enroll for the same pair.
      Err(Error::Conflict(msg)) => {
        let existing = self
          .find(student_id, course_id)
          .await?
          .ok_or(Error::Conflict(msg))?;
        Ok(Enrolled { enrollment: existing, already_enrolled: true })
      }
      Err(e) => Err(e),
    }
  }

  // ── Completion tracking ───────────────────────────────────────────────────

  /// Mark a lesson complete and recompute progress.
  ///
  /// Idempotent; the lesson indices are not checked against the current
  /// course structure.
  pub async fn complete_lesson(
    &self,
    principal: &Principal,
    course_id: Uuid,
    lesson: LessonRef,
  ) -> Result<Enrollment> {
    let course = self.course(course_id).await?;

    let (enrollment, finished) = self
      .mutate(principal.user_id, course_id, |e| {
        e.mark_completed(lesson);
        Ok(progress::apply(e, &course))
      })
      .await?;

    debug!(
      student_id = %principal.user_id,
      %course_id,
      module_index = lesson.module_index,
      lesson_index = lesson.lesson_index,
      progress = enrollment.progress,
      "lesson completed"
    );
    if finished {
      info!(student_id = %principal.user_id, %course_id, "course completed");
    }
    Ok(enrollment)
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  /// Append an assignment submission. Earlier submissions are kept.
  pub async fn submit_assignment(
    &self,
    principal: &Principal,
    course_id: Uuid,
    input: NewSubmission,
  ) -> Result<AssignmentReceipt> {
    let link = non_blank(input.link);
    let answer_text = non_blank(input.answer_text);

    let (enrollment, submission) = self
      .mutate(principal.user_id, course_id, |e| {
        let entry = AssignmentSubmission {
          module_index: input.module_index,
          link:         link.clone(),
          answer_text:  answer_text.clone(),
          submitted_at: Utc::now(),
          status:       SubmissionStatus::Submitted,
          score:        None,
        };
        Ok(e.push_assignment(entry).clone())
      })
      .await?;

    debug!(
      student_id = %principal.user_id,
      %course_id,
      module_index = input.module_index,
      "assignment submitted"
    );
    Ok(AssignmentReceipt { enrollment, submission })
  }

  // ── Quizzes ───────────────────────────────────────────────────────────────

  /// Grade an answer sheet for a module quiz and log the attempt.
  ///
  /// Does not touch completed lessons or progress.
  pub async fn submit_quiz(
    &self,
    principal: &Principal,
    course_id: Uuid,
    module_index: u32,
    answers: &[Option<i64>],
  ) -> Result<QuizOutcome> {
    let course = self.course(course_id).await?;

    let (enrollment, grade) = self
      .mutate(principal.user_id, course_id, |e| {
        let module = course
          .module(module_index)
          .filter(|m| m.has_quiz())
          .ok_or(Error::ModuleNotFound { course_id, module_index })?;
        let grade = grading::grade(module, answers);
        e.push_quiz(QuizAttempt {
          module_index,
          score: grade.score,
          total: grade.total,
          submitted_at: Utc::now(),
        });
        Ok(grade)
      })
      .await?;

    debug!(
      student_id = %principal.user_id,
      %course_id,
      module_index,
      score = grade.score,
      total = grade.total,
      "quiz graded"
    );
    Ok(QuizOutcome {
      score: grade.score,
      total: grade.total,
      correct_answers: grade.correct_answers,
      enrollment,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Whether the principal is enrolled in `course_id`.
  pub async fn enrollment_status(
    &self,
    principal: &Principal,
    course_id: Uuid,
  ) -> Result<bool> {
    Ok(self.find(principal.user_id, course_id).await?.is_some())
  }

  pub async fn get_enrollment(
    &self,
    principal: &Principal,
    course_id: Uuid,
  ) -> Result<Enrollment> {
    self
      .find(principal.user_id, course_id)
      .await?
      .ok_or(Error::NotEnrolled { student_id: principal.user_id, course_id })
  }

  pub async fn my_enrollments(&self, principal: &Principal) -> Result<Vec<Enrollment>> {
    self
      .store
      .list_by_student(principal.user_id)
      .await
      .map_err(Into::into)
  }

  /// Every enrollment in a course. Admins only.
  pub async fn course_roster(
    &self,
    principal: &Principal,
    course_id: Uuid,
  ) -> Result<Vec<Enrollment>> {
    if !principal.is_admin() {
      return Err(Error::Forbidden);
    }
    self.course(course_id).await?;
    self.store.list_by_course(course_id).await.map_err(Into::into)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn course(&self, course_id: Uuid) -> Result<Course> {
    self
      .courses
      .get_course(course_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::CourseNotFound(course_id))
  }

  async fn find(&self, student_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
    self
      .store
      .find_by_student_and_course(student_id, course_id)
      .await
      .map_err(Into::into)
  }

  /// Load, apply `change`, and save with compare-and-swap while holding the
  /// enrollment's write lock, repeating on a stale write up to the
  /// configured attempt limit.
  async fn mutate<T, F>(
    &self,
    student_id: Uuid,
    course_id: Uuid,
    mut change: F,
  ) -> Result<(Enrollment, T)>
  where
    F: FnMut(&mut Enrollment) -> Result<T> + Send,
    T: Send,
  {
    let _guard = self.locks.acquire(student_id, course_id).await;
    let max_attempts = self.config.max_write_attempts.max(1);
    let mut attempt = 1;
    loop {
      let mut enrollment = self
        .find(student_id, course_id)
        .await?
        .ok_or(Error::NotEnrolled { student_id, course_id })?;

      let output = change(&mut enrollment)?;

      match self.store.save(&enrollment).await.map_err(Into::<Error>::into) {
        Ok(saved) => return Ok((saved, output)),
        Err(Error::StaleWrite { enrollment_id, version }) if attempt < max_attempts => {
          warn!(%enrollment_id, version, attempt, "concurrent update, retrying");
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.trim().is_empty())
}
