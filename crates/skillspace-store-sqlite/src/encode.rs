//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Logs and completion sets
//! are stored as compact JSON arrays. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use skillspace_core::{
  course::{Course, CourseStatus, Module},
  enrollment::{AssignmentSubmission, Enrollment, EnrollmentStatus, LessonRef, QuizAttempt},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status enums ────────────────────────────────────────────────────────────

pub fn encode_enrollment_status(s: EnrollmentStatus) -> &'static str {
  match s {
    EnrollmentStatus::Enrolled => "enrolled",
    EnrollmentStatus::Completed => "completed",
  }
}

pub fn decode_enrollment_status(s: &str) -> Result<EnrollmentStatus> {
  match s {
    "enrolled" => Ok(EnrollmentStatus::Enrolled),
    "completed" => Ok(EnrollmentStatus::Completed),
    other => Err(Error::Decode(format!("unknown enrollment status: {other:?}"))),
  }
}

pub fn encode_course_status(s: CourseStatus) -> &'static str {
  match s {
    CourseStatus::Draft => "draft",
    CourseStatus::Published => "published",
  }
}

pub fn decode_course_status(s: &str) -> Result<CourseStatus> {
  match s {
    "draft" => Ok(CourseStatus::Draft),
    "published" => Ok(CourseStatus::Published),
    other => Err(Error::Decode(format!("unknown course status: {other:?}"))),
  }
}

// ─── Integers ────────────────────────────────────────────────────────────────

/// SQLite integers are signed; versions never get near the boundary.
pub fn encode_version(v: u64) -> Result<i64> {
  i64::try_from(v).map_err(|_| Error::Decode(format!("version {v} out of range")))
}

pub fn decode_version(v: i64) -> Result<u64> {
  u64::try_from(v).map_err(|_| Error::Decode(format!("negative version {v}")))
}

pub fn decode_progress(p: i64) -> Result<u8> {
  u8::try_from(p)
    .ok()
    .filter(|p| *p <= 100)
    .ok_or_else(|| Error::Decode(format!("progress {p} out of range")))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawEnrollment`].
pub const ENROLLMENT_COLUMNS: &str = "enrollment_id, student_id, course_id, status, progress,
  completed_lessons, assignments, quizzes, version, created_at, updated_at";

/// Raw values read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub enrollment_id:     String,
  pub student_id:        String,
  pub course_id:         String,
  pub status:            String,
  pub progress:          i64,
  pub completed_lessons: String,
  pub assignments:       String,
  pub quizzes:           String,
  pub version:           i64,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawEnrollment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      enrollment_id:     row.get(0)?,
      student_id:        row.get(1)?,
      course_id:         row.get(2)?,
      status:            row.get(3)?,
      progress:          row.get(4)?,
      completed_lessons: row.get(5)?,
      assignments:       row.get(6)?,
      quizzes:           row.get(7)?,
      version:           row.get(8)?,
      created_at:        row.get(9)?,
      updated_at:        row.get(10)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    let completed_lessons: Vec<LessonRef> = serde_json::from_str(&self.completed_lessons)?;
    let assignments: Vec<AssignmentSubmission> = serde_json::from_str(&self.assignments)?;
    let quizzes: Vec<QuizAttempt> = serde_json::from_str(&self.quizzes)?;

    Ok(Enrollment {
      enrollment_id: decode_uuid(&self.enrollment_id)?,
      student_id: decode_uuid(&self.student_id)?,
      course_id: decode_uuid(&self.course_id)?,
      status: decode_enrollment_status(&self.status)?,
      progress: decode_progress(self.progress)?,
      completed_lessons,
      assignments,
      quizzes,
      version: decode_version(self.version)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:    String,
  pub title:        String,
  pub status:       String,
  pub modules_json: String,
}

impl RawCourse {
  /// Decode and validate. A course that fails validation never reaches the
  /// engine.
  pub fn into_course(self) -> Result<Course> {
    let modules: Vec<Module> = serde_json::from_str(&self.modules_json)?;
    let course = Course {
      course_id: decode_uuid(&self.course_id)?,
      title: self.title,
      status: decode_course_status(&self.status)?,
      modules,
    };
    course.validate()?;
    Ok(course)
  }
}
