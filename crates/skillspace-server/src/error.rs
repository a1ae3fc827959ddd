//! Error type for server setup and course import.

use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("auth configuration error: {0}")]
  Auth(#[from] AuthError),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("invalid course: {0}")]
  Course(#[from] skillspace_core::Error),

  #[error("course file is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[from] skillspace_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
