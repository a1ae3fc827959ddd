//! `GET /admin/courses/:course_id/enrollments`: everyone enrolled in a course.
//!
//! Role checks live in the engine; a student caller gets 403.

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use skillspace_core::{
  enrollment::Enrollment,
  identity::IdentityProvider,
  store::{CourseReader, EnrollmentStore},
};
use uuid::Uuid;

use crate::{ApiState, auth::Authenticated, error::ApiError};

pub async fn list<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<Enrollment>>, ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  Ok(Json(state.engine.course_roster(&me, course_id).await?))
}
