//! The storage traits consumed by the engine.
//!
//! Backends (e.g. `skillspace-store-sqlite`) implement these. Their error
//! type must convert into [`crate::Error`] so the engine can tell a
//! duplicate or a lost compare-and-swap apart from a plain storage failure.

use std::future::Future;

use uuid::Uuid;

use crate::{course::Course, enrollment::Enrollment};

// ─── Course catalog ──────────────────────────────────────────────────────────

/// Read-only access to course structure.
pub trait CourseReader: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Fetch a course in any publication state. Returns `None` if unknown.
  fn get_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + '_;
}

// ─── Enrollments ─────────────────────────────────────────────────────────────

/// Persistence for [`Enrollment`] records.
///
/// At most one record exists per `(student_id, course_id)`. Saves are
/// compare-and-swap on [`Enrollment::version`], which is what makes the
/// engine's read-modify-write safe under concurrent calls.
pub trait EnrollmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Create a fresh enrollment. Fails with a conflict if the pair exists.
  fn create(
    &self,
    student_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  /// Look up the enrollment for a pair. `None` means "not enrolled".
  fn find_by_student_and_course(
    &self,
    student_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// Persist the whole record if the stored version still equals
  /// `enrollment.version`. Returns the saved record with its bumped version.
  ///
  /// Fails with a stale-write error when another save landed first.
  fn save<'a>(
    &'a self,
    enrollment: &'a Enrollment,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + 'a;

  /// All enrollments of one student, oldest first.
  fn list_by_student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// All enrollments in one course, oldest first.
  fn list_by_course(
    &self,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;
}
