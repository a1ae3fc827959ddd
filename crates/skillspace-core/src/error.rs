//! Error types for `skillspace-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("student {student_id} is not enrolled in course {course_id}")]
  NotEnrolled { student_id: Uuid, course_id: Uuid },

  #[error("course not found or unpublished: {0}")]
  CourseNotFound(Uuid),

  #[error("course {course_id} has no quiz at module {module_index}")]
  ModuleNotFound { course_id: Uuid, module_index: u32 },

  #[error("conflict: {0}")]
  Conflict(String),

  /// A compare-and-swap save found a newer version in storage.
  #[error("enrollment {enrollment_id} changed since version {version}")]
  StaleWrite { enrollment_id: Uuid, version: u64 },

  #[error("forbidden")]
  Forbidden,

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
