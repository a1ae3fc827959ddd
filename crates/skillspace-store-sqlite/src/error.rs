//! Error type for `skillspace-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] skillspace_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value this version cannot interpret.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("student {student_id} is already enrolled in course {course_id}")]
  DuplicateEnrollment { student_id: Uuid, course_id: Uuid },

  #[error("enrollment not found for student {student_id} in course {course_id}")]
  EnrollmentNotFound { student_id: Uuid, course_id: Uuid },

  /// The row's version moved on since the caller read it.
  #[error("enrollment {enrollment_id} changed since version {version}")]
  StaleWrite { enrollment_id: Uuid, version: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for skillspace_core::Error {
  fn from(e: Error) -> Self {
    use skillspace_core::Error as Core;
    match e {
      Error::Core(inner) => inner,
      Error::DuplicateEnrollment { .. } => Core::Conflict(e.to_string()),
      Error::EnrollmentNotFound { student_id, course_id } => {
        Core::NotEnrolled { student_id, course_id }
      }
      Error::StaleWrite { enrollment_id, version } => {
        Core::StaleWrite { enrollment_id, version }
      }
      other => Core::Storage(Box::new(other)),
    }
  }
}
