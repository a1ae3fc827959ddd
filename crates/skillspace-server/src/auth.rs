//! HTTP Basic-auth identity provider backed by configured accounts.

use std::collections::HashMap;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;
use serde::Deserialize;
use skillspace_core::identity::{IdentityProvider, Principal, Role};
use thiserror::Error;
use uuid::Uuid;

/// One login accepted by this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub user_id:       Uuid,
  #[serde(default)]
  pub role:          Role,
}

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("account {0:?} is configured more than once")]
  DuplicateUsername(String),

  #[error("account {username:?} has an unparseable password hash: {reason}")]
  InvalidHash { username: String, reason: String },

  #[error("could not hash password: {0}")]
  Hashing(String),
}

/// Produce the argon2id PHC string to paste into an account's `password_hash`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verifies `Authorization: Basic …` credentials against a fixed account list.
pub struct BasicAuthIdentity {
  accounts: HashMap<String, AccountConfig>,
}

impl BasicAuthIdentity {
  /// Index the accounts by username, rejecting duplicates and hashes that
  /// would never verify.
  pub fn new(accounts: impl IntoIterator<Item = AccountConfig>) -> Result<Self, AuthError> {
    let mut by_name = HashMap::new();
    for account in accounts {
      PasswordHash::new(&account.password_hash).map_err(|e| AuthError::InvalidHash {
        username: account.username.clone(),
        reason:   e.to_string(),
      })?;
      if by_name.contains_key(&account.username) {
        return Err(AuthError::DuplicateUsername(account.username));
      }
      by_name.insert(account.username.clone(), account);
    }
    Ok(Self { accounts: by_name })
  }

  pub fn is_empty(&self) -> bool { self.accounts.is_empty() }

  /// Check a raw header value. `None` on any malformed or wrong credential.
  pub fn verify(&self, header_val: &str) -> Option<Principal> {
    let encoded = header_val.strip_prefix("Basic ")?;
    let decoded = B64.decode(encoded.trim()).ok()?;
    let creds   = std::str::from_utf8(&decoded).ok()?;

    let (username, password) = creds.split_once(':')?;
    let account = self.accounts.get(username)?;

    let parsed_hash = PasswordHash::new(&account.password_hash).ok()?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .ok()?;

    Some(Principal { user_id: account.user_id, role: account.role })
  }
}

impl IdentityProvider for BasicAuthIdentity {
  async fn authenticate(&self, credential: Option<&str>) -> Option<Principal> {
    let principal = self.verify(credential?);
    if principal.is_none() {
      tracing::debug!("rejected credentials");
    }
    principal
  }
}
