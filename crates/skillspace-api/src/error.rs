//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use skillspace_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  /// The request could not be parsed into the expected shape.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] CoreError),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::NotEnrolled { .. }
        | CoreError::CourseNotFound(_)
        | CoreError::ModuleNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) | CoreError::StaleWrite { .. } => StatusCode::CONFLICT,
        CoreError::Forbidden => StatusCode::FORBIDDEN,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if let ApiError::Unauthorized = self {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"skillspace\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn engine_errors_map_to_statuses() {
    let id = Uuid::new_v4();
    let cases = [
      (CoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
      (CoreError::NotEnrolled { student_id: id, course_id: id }, StatusCode::NOT_FOUND),
      (CoreError::CourseNotFound(id), StatusCode::NOT_FOUND),
      (CoreError::ModuleNotFound { course_id: id, module_index: 3 }, StatusCode::NOT_FOUND),
      (CoreError::Conflict("dup".into()), StatusCode::CONFLICT),
      (CoreError::StaleWrite { enrollment_id: id, version: 2 }, StatusCode::CONFLICT),
      (CoreError::Forbidden, StatusCode::FORBIDDEN),
      (CoreError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(ApiError::from(err).status(), expected);
    }
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"skillspace\""
    );
  }
}
