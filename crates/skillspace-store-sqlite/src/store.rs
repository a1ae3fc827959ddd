//! [`SqliteStore`]: the SQLite implementation of [`EnrollmentStore`] and
//! [`CourseReader`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use skillspace_core::{
  course::Course,
  enrollment::Enrollment,
  store::{CourseReader, EnrollmentStore},
};

use crate::{
  Error, Result,
  encode::{
    ENROLLMENT_COLUMNS, RawCourse, RawEnrollment, encode_course_status, encode_dt,
    encode_enrollment_status, encode_json, encode_uuid, encode_version,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An enrollment store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened to a compare-and-swap `UPDATE`.
enum SaveOutcome {
  Saved,
  Stale,
  Missing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace a course. Used by the catalog import path; the
  /// engine itself only reads courses.
  pub async fn put_course(&self, course: &Course) -> Result<()> {
    course.validate()?;

    let id_str       = encode_uuid(course.course_id);
    let title        = course.title.clone();
    let status_str   = encode_course_status(course.status).to_owned();
    let modules_json = encode_json(&course.modules)?;
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO courses (course_id, title, status, modules_json, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (course_id) DO UPDATE SET
             title        = excluded.title,
             status       = excluded.status,
             modules_json = excluded.modules_json,
             updated_at   = excluded.updated_at",
          rusqlite::params![id_str, title, status_str, modules_json, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(course_id = %course.course_id, "course stored");
    Ok(())
  }

  /// Run an enrollment query with a single string parameter.
  async fn query_enrollments(
    &self,
    where_clause: &'static str,
    param: String,
  ) -> Result<Vec<Enrollment>> {
    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE {where_clause}
           ORDER BY created_at, enrollment_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![param], RawEnrollment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }
}

// ─── CourseReader impl ───────────────────────────────────────────────────────

impl CourseReader for SqliteStore {
  type Error = Error;

  async fn get_course(&self, course_id: Uuid) -> Result<Option<Course>> {
    let id_str = encode_uuid(course_id);

    let raw: Option<RawCourse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT course_id, title, status, modules_json FROM courses WHERE course_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCourse {
                  course_id:    row.get(0)?,
                  title:        row.get(1)?,
                  status:       row.get(2)?,
                  modules_json: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCourse::into_course).transpose()
  }
}

// ─── EnrollmentStore impl ────────────────────────────────────────────────────

impl EnrollmentStore for SqliteStore {
  type Error = Error;

  async fn create(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
    let enrollment = Enrollment::new(student_id, course_id);

    let id_str      = encode_uuid(enrollment.enrollment_id);
    let student_str = encode_uuid(student_id);
    let course_str  = encode_uuid(course_id);
    let status_str  = encode_enrollment_status(enrollment.status).to_owned();
    let created_str = encode_dt(enrollment.created_at);
    let updated_str = encode_dt(enrollment.updated_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO enrollments (
             enrollment_id, student_id, course_id, status, progress,
             completed_lessons, assignments, quizzes, version,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 0, '[]', '[]', '[]', 0, ?5, ?6)
           ON CONFLICT (student_id, course_id) DO NOTHING",
          rusqlite::params![
            id_str,
            student_str,
            course_str,
            status_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(changed == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateEnrollment { student_id, course_id });
    }
    Ok(enrollment)
  }

  async fn find_by_student_and_course(
    &self,
    student_id: Uuid,
    course_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    let student_str = encode_uuid(student_id);
    let course_str  = encode_uuid(course_id);

    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
           WHERE student_id = ?1 AND course_id = ?2"
        );
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![student_str, course_str],
              RawEnrollment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn save(&self, enrollment: &Enrollment) -> Result<Enrollment> {
    let mut saved = enrollment.clone();
    saved.version += 1;
    saved.updated_at = Utc::now();

    let id_str        = encode_uuid(enrollment.enrollment_id);
    let status_str    = encode_enrollment_status(saved.status).to_owned();
    let progress      = i64::from(saved.progress.min(100));
    let completed_str = encode_json(&saved.completed_lessons)?;
    let assign_str    = encode_json(&saved.assignments)?;
    let quizzes_str   = encode_json(&saved.quizzes)?;
    let updated_str   = encode_dt(saved.updated_at);
    let expected      = encode_version(enrollment.version)?;

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE enrollments SET
             status            = ?1,
             progress          = ?2,
             completed_lessons = ?3,
             assignments       = ?4,
             quizzes           = ?5,
             version           = version + 1,
             updated_at        = ?6
           WHERE enrollment_id = ?7 AND version = ?8",
          rusqlite::params![
            status_str,
            progress,
            completed_str,
            assign_str,
            quizzes_str,
            updated_str,
            id_str,
            expected,
          ],
        )?;
        if changed == 1 {
          return Ok(SaveOutcome::Saved);
        }

        let exists = conn
          .query_row(
            "SELECT 1 FROM enrollments WHERE enrollment_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        Ok(if exists { SaveOutcome::Stale } else { SaveOutcome::Missing })
      })
      .await?;

    match outcome {
      SaveOutcome::Saved => Ok(saved),
      SaveOutcome::Stale => Err(Error::StaleWrite {
        enrollment_id: enrollment.enrollment_id,
        version:       enrollment.version,
      }),
      SaveOutcome::Missing => Err(Error::EnrollmentNotFound {
        student_id: enrollment.student_id,
        course_id:  enrollment.course_id,
      }),
    }
  }

  async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Enrollment>> {
    self
      .query_enrollments("student_id = ?1", encode_uuid(student_id))
      .await
  }

  async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>> {
    self
      .query_enrollments("course_id = ?1", encode_uuid(course_id))
      .await
  }
}
