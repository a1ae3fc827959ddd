//! Authenticated principals and the identity-provider seam.
//!
//! Every engine operation receives the caller's [`Principal`] explicitly;
//! nothing in this crate reads an ambient "current user".

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Student,
  Admin,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Principal {
  pub fn student(user_id: Uuid) -> Self { Self { user_id, role: Role::Student } }

  pub fn admin(user_id: Uuid) -> Self { Self { user_id, role: Role::Admin } }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// Turns a caller-supplied credential into a [`Principal`].
///
/// The credential is the raw `Authorization` header value; how it is parsed
/// and verified is up to the implementation.
pub trait IdentityProvider: Send + Sync {
  /// Returns `None` when the credential is missing, malformed or wrong.
  fn authenticate(
    &self,
    credential: Option<&str>,
  ) -> impl Future<Output = Option<Principal>> + Send;
}
