//! The [`Authenticated`] extractor and `GET /me`.

use axum::{
  Json,
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use skillspace_core::{
  identity::{IdentityProvider, Principal},
  store::{CourseReader, EnrollmentStore},
};

use crate::{ApiState, error::ApiError};

/// The caller, as resolved by the configured [`IdentityProvider`].
///
/// Present in a handler's arguments means the request was authenticated;
/// otherwise the request is rejected with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S, C, I> FromRequestParts<ApiState<S, C, I>> for Authenticated
where
  S: EnrollmentStore,
  C: CourseReader,
  I: IdentityProvider,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, C, I>,
  ) -> Result<Self, Self::Rejection> {
    let credential = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok());

    state
      .identity
      .authenticate(credential)
      .await
      .map(Authenticated)
      .ok_or(ApiError::Unauthorized)
  }
}

/// `GET /me`: echo the authenticated principal.
pub async fn me(Authenticated(principal): Authenticated) -> Json<Principal> { Json(principal) }
