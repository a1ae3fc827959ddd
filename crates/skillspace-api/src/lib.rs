//! JSON REST API for SkillSpace.
//!
//! Exposes an axum [`Router`] over an [`EnrollmentEngine`]. Every route
//! resolves the caller through an [`IdentityProvider`] first; TLS and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(skillspace_api::api_router(engine, identity))
//! ```

pub mod auth;
pub mod enrollments;
pub mod error;
pub mod etag;
pub mod roster;


use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use skillspace_core::{
  EnrollmentEngine,
  identity::IdentityProvider,
  store::{CourseReader, EnrollmentStore},
};

pub use auth::Authenticated;
pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through every handler.
pub struct ApiState<S, C, I> {
  pub engine:   EnrollmentEngine<S, C>,
  pub identity: Arc<I>,
}

impl<S, C, I> Clone for ApiState<S, C, I> {
  fn clone(&self) -> Self {
    Self {
      engine:   self.engine.clone(),
      identity: Arc::clone(&self.identity),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, C, I>(engine: EnrollmentEngine<S, C>, identity: Arc<I>) -> Router<()>
where
  S: EnrollmentStore + 'static,
  C: CourseReader + 'static,
  I: IdentityProvider + 'static,
{
  Router::new()
    .route("/me", get(auth::me))
    // Enrollments of the caller
    .route(
      "/enrollments",
      get(enrollments::list::<S, C, I>).post(enrollments::enroll::<S, C, I>),
    )
    .route("/enrollments/status/{course_id}", get(enrollments::status::<S, C, I>))
    .route("/enrollments/{course_id}", get(enrollments::get_one::<S, C, I>))
    .route("/enrollments/{course_id}/lessons", post(enrollments::complete_lesson::<S, C, I>))
    .route(
      "/enrollments/{course_id}/assignments",
      post(enrollments::submit_assignment::<S, C, I>),
    )
    .route("/enrollments/{course_id}/quizzes", post(enrollments::submit_quiz::<S, C, I>))
    // Admin
    .route("/admin/courses/{course_id}/enrollments", get(roster::list::<S, C, I>))
    .with_state(ApiState { engine, identity })
}
