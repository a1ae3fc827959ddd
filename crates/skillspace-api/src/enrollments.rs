//! Handlers for the caller's own `/enrollments`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/enrollments` | All of the caller's enrollments |
//! | `POST` | `/enrollments` | Body: [`EnrollBody`]; 201 when created, 200 when it already existed |
//! | `GET`  | `/enrollments/status/:course_id` | `{"isEnrolled": bool}` |
//! | `GET`  | `/enrollments/:course_id` | Single enrollment with `ETag` |
//! | `POST` | `/enrollments/:course_id/lessons` | Body: [`LessonBody`] |
//! | `POST` | `/enrollments/:course_id/assignments` | Body: [`AssignmentBody`]; returns 201 |
//! | `POST` | `/enrollments/:course_id/quizzes` | Body: [`QuizBody`]; returns 201 |
//!
//! Indices arrive as signed JSON integers and are range-checked before they
//! reach the engine; anything that is not an integer is a 400.

use axum::{
  Json,
  extract::{Path, State, rejection::{JsonRejection, PathRejection}},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use skillspace_core::{
  engine::{AssignmentReceipt, Enrolled, NewSubmission, QuizOutcome},
  enrollment::{self, Enrollment, LessonRef},
  identity::IdentityProvider,
  store::{CourseReader, EnrollmentStore},
};
use uuid::Uuid;

use crate::{
  ApiState,
  auth::Authenticated,
  error::ApiError,
  etag::{compute_etag, matches_if_none_match},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /enrollments`
pub async fn list<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
) -> Result<Json<Vec<Enrollment>>, ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  Ok(Json(state.engine.my_enrollments(&me).await?))
}

// ─── Enroll ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
  pub course_id: Uuid,
}

/// `POST /enrollments`
pub async fn enroll<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  body: Result<Json<EnrollBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Enrolled>), ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Json(body) = body?;
  let enrolled = state.engine.enroll(&me, body.course_id).await?;
  let status = if enrolled.already_enrolled { StatusCode::OK } else { StatusCode::CREATED };
  Ok((status, Json(enrolled)))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /enrollments/status/:course_id`
pub async fn status<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  let is_enrolled = state.engine.enrollment_status(&me, course_id).await?;
  Ok(Json(json!({ "isEnrolled": is_enrolled })))
}

/// `GET /enrollments/:course_id`
///
/// Answers 304 when `If-None-Match` already names the current version.
pub async fn get_one<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  let enrollment = state.engine.get_enrollment(&me, course_id).await?;
  let etag = compute_etag(&enrollment);

  if matches_if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(enrollment)).into_response())
}

// ─── Lessons ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBody {
  pub module_index: i64,
  pub lesson_index: i64,
}

/// `POST /enrollments/:course_id/lessons`
pub async fn complete_lesson<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<LessonBody>, JsonRejection>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  let Json(body) = body?;
  let lesson = LessonRef::new(body.module_index, body.lesson_index)?;
  Ok(Json(state.engine.complete_lesson(&me, course_id, lesson).await?))
}

// ─── Assignments ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentBody {
  pub module_index: i64,
  pub link:         Option<String>,
  pub answer_text:  Option<String>,
}

/// `POST /enrollments/:course_id/assignments`
pub async fn submit_assignment<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<AssignmentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<AssignmentReceipt>), ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  let Json(body) = body?;
  let submission = NewSubmission {
    module_index: enrollment::index(body.module_index, "moduleIndex")?,
    link:         body.link,
    answer_text:  body.answer_text,
  };
  let receipt = state.engine.submit_assignment(&me, course_id, submission).await?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

// ─── Quizzes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBody {
  pub module_index: i64,
  /// One entry per question; `null` leaves a question unanswered.
  pub answers:      Vec<Option<i64>>,
}

/// `POST /enrollments/:course_id/quizzes`
pub async fn submit_quiz<S, C, I>(
  State(state): State<ApiState<S, C, I>>,
  Authenticated(me): Authenticated,
  course_id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<QuizBody>, JsonRejection>,
) -> Result<(StatusCode, Json<QuizOutcome>), ApiError>
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  let Path(course_id) = course_id?;
  let Json(body) = body?;
  let module_index = enrollment::index(body.module_index, "moduleIndex")?;
  let outcome = state
    .engine
    .submit_quiz(&me, course_id, module_index, &body.answers)
    .await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}
