//! Enrollment: the record binding one student to one course.
//!
//! Completions behave as a set. The assignment and quiz logs are append-only;
//! nothing in this crate edits or removes a past entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
  #[default]
  Enrolled,
  Completed,
}

// ─── Lesson references ───────────────────────────────────────────────────────

/// Position of a lesson inside a course: module first, then lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
  pub module_index: u32,
  pub lesson_index: u32,
}

impl LessonRef {
  /// Build a reference from untrusted signed indices.
  pub fn new(module_index: i64, lesson_index: i64) -> Result<Self> {
    Ok(Self {
      module_index: index(module_index, "moduleIndex")?,
      lesson_index: index(lesson_index, "lessonIndex")?,
    })
  }
}

/// Convert a caller-supplied index, rejecting negatives and overflow.
pub fn index(value: i64, field: &str) -> Result<u32> {
  u32::try_from(value).map_err(|_| {
    Error::InvalidInput(format!("{field} must be a non-negative integer, got {value}"))
  })
}

// ─── Log entries ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  #[default]
  Submitted,
  Reviewed,
}

/// One assignment deliverable. Several may exist for the same module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSubmission {
  pub module_index: u32,
  /// Usually a shared-drive link.
  pub link:         Option<String>,
  pub answer_text:  Option<String>,
  pub submitted_at: DateTime<Utc>,
  pub status:       SubmissionStatus,
  pub score:        Option<u32>,
}

/// One graded quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
  pub module_index: u32,
  pub score:        u32,
  pub total:        u32,
  pub submitted_at: DateTime<Utc>,
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
  pub enrollment_id:     Uuid,
  pub student_id:        Uuid,
  pub course_id:         Uuid,
  pub status:            EnrollmentStatus,
  /// Cached percentage in `0..=100`; see [`crate::progress`].
  pub progress:          u8,
  /// Distinct completed lessons, in the order they were first marked.
  pub completed_lessons: Vec<LessonRef>,
  pub assignments:       Vec<AssignmentSubmission>,
  pub quizzes:           Vec<QuizAttempt>,
  /// Concurrency token; bumped by the store on every successful save.
  pub version:           u64,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Enrollment {
  /// A fresh enrollment as the store creates it.
  pub fn new(student_id: Uuid, course_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      enrollment_id: Uuid::new_v4(),
      student_id,
      course_id,
      status: EnrollmentStatus::Enrolled,
      progress: 0,
      completed_lessons: Vec::new(),
      assignments: Vec::new(),
      quizzes: Vec::new(),
      version: 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn has_completed(&self, lesson: LessonRef) -> bool {
    self.completed_lessons.contains(&lesson)
  }

  /// Record a completion. Returns `false` if the lesson was already there.
  pub fn mark_completed(&mut self, lesson: LessonRef) -> bool {
    if self.has_completed(lesson) {
      return false;
    }
    self.completed_lessons.push(lesson);
    true
  }

  /// Append a submission and return a reference to the stored entry.
  pub fn push_assignment(
    &mut self,
    submission: AssignmentSubmission,
  ) -> &AssignmentSubmission {
    self.assignments.push(submission);
    &self.assignments[self.assignments.len() - 1]
  }

  pub fn push_quiz(&mut self, attempt: QuizAttempt) {
    self.quizzes.push(attempt);
  }

  /// Submissions for one module, oldest first.
  pub fn assignments_for(
    &self,
    module_index: u32,
  ) -> impl Iterator<Item = &AssignmentSubmission> {
    self
      .assignments
      .iter()
      .filter(move |a| a.module_index == module_index)
  }

  /// Quiz attempts for one module, oldest first.
  pub fn quizzes_for(&self, module_index: u32) -> impl Iterator<Item = &QuizAttempt> {
    self.quizzes.iter().filter(move |q| q.module_index == module_index)
  }
}
