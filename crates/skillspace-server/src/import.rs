//! Course catalog import.
//!
//! The engine only reads courses; this is how they get into the store. The
//! input is a JSON array of courses in the same camelCase shape the API
//! serialises.

use skillspace_core::course::Course;
use skillspace_store_sqlite::SqliteStore;

use crate::error::Result;

/// Parse and validate every course before anything is written.
pub fn parse_courses(json: &str) -> Result<Vec<Course>> {
  let courses: Vec<Course> = serde_json::from_str(json)?;
  for course in &courses {
    course.validate()?;
  }
  Ok(courses)
}

/// Insert or replace each course. Returns how many were stored.
pub async fn import_courses(store: &SqliteStore, courses: &[Course]) -> Result<usize> {
  for course in courses {
    store.put_course(course).await?;
    tracing::info!(course_id = %course.course_id, title = %course.title, "imported course");
  }
  Ok(courses.len())
}
